use std::collections::HashSet;

/// Exercise ids that workout sanitizers accept.
///
/// Passed explicitly to the sanitizers so they stay independent of whichever
/// exercise database the caller has loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExerciseCatalog {
    /// Accept every exercise id.
    #[default]
    Any,
    /// Accept only the listed ids.
    Only(HashSet<String>),
}

impl ExerciseCatalog {
    pub fn any() -> Self {
        ExerciseCatalog::Any
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExerciseCatalog::Only(ids.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            ExerciseCatalog::Any => true,
            ExerciseCatalog::Only(ids) => ids.contains(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_accepts_everything() {
        assert!(ExerciseCatalog::any().contains("pushup"));
        assert!(ExerciseCatalog::any().contains(""));
    }

    #[test]
    fn test_only_restricts() {
        let catalog = ExerciseCatalog::from_ids(["pushup", "squat"]);
        assert!(catalog.contains("squat"));
        assert!(!catalog.contains("deadlift"));
    }

    #[test]
    fn test_empty_list_rejects_everything() {
        let catalog = ExerciseCatalog::from_ids(Vec::<String>::new());
        assert!(!catalog.contains("pushup"));
    }
}
