use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive training days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Streak {
    pub count: u32,
    pub last_date: Option<String>,
}

impl Streak {
    pub fn new(count: u32, last_date: impl Into<String>) -> Self {
        Self {
            count,
            last_date: Some(last_date.into()),
        }
    }

    fn last(&self) -> Option<NaiveDate> {
        self.last_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }

    /// The streak as seen on `today`: kept if the last active day was today
    /// or yesterday, otherwise broken.
    pub fn current(&self, today: NaiveDate) -> u32 {
        match self.last() {
            Some(last) if last == today || today.pred_opt() == Some(last) => self.count,
            _ => 0,
        }
    }

    /// Records `today` as an active day.
    pub fn advance(&self, today: NaiveDate) -> Streak {
        let last = self.last();
        if last == Some(today) {
            return self.clone();
        }
        let count = if last.is_some() && today.pred_opt() == last {
            self.count.saturating_add(1)
        } else {
            1
        };
        Streak {
            count,
            last_date: Some(today.format("%Y-%m-%d").to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_kept_through_yesterday() {
        let streak = Streak::new(5, "2024-01-01");
        assert_eq!(streak.current(date(2024, 1, 1)), 5);
        assert_eq!(streak.current(date(2024, 1, 2)), 5);
        assert_eq!(streak.current(date(2024, 1, 3)), 0);
        assert_eq!(Streak::default().current(date(2024, 1, 3)), 0);
    }

    #[test]
    fn test_advance() {
        let streak = Streak::new(5, "2024-01-01");
        assert_eq!(streak.advance(date(2024, 1, 2)), Streak::new(6, "2024-01-02"));
        assert_eq!(streak.advance(date(2024, 1, 1)), streak);
        assert_eq!(streak.advance(date(2024, 1, 9)), Streak::new(1, "2024-01-09"));
        assert_eq!(
            Streak::default().advance(date(2024, 1, 9)),
            Streak::new(1, "2024-01-09")
        );
    }

    #[test]
    fn test_absent_last_date_serializes_null() {
        let value = serde_json::to_value(Streak::default()).unwrap();
        assert_eq!(value, serde_json::json!({ "count": 0, "lastDate": null }));
    }
}
