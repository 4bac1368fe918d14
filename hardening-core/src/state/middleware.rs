//! Middleware wrapped around [`Store::dispatch`].
//!
//! A middleware sees every action before the reducer does. It can pass the
//! action on with [`Next::run`], change it, drop it, or hold on to the `Next`
//! and finish it later from a timer task with [`Next::resume`]. Timed
//! middleware spawn on the ambient Tokio runtime.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::store::{Dispatched, Next, Store};
use super::{Action, StateError};
use crate::models::AppState;
use crate::storage::StorageAdapter;

pub trait Middleware: Send + Sync {
    fn handle(&self, store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError>;
}

impl<F> Middleware for F
where
    F: Fn(&Store, Next, Action) -> Result<Dispatched, StateError> + Send + Sync,
{
    fn handle(&self, store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        self(store, next, action)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn runtime() -> Result<Handle, StateError> {
    Handle::try_current().map_err(|_| StateError::NoRuntime)
}

fn type_set<I, S>(types: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    types.into_iter().map(Into::into).collect()
}

/// Logs each action with the state before and after it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn handle(&self, store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return next.run(action);
        }

        let name = action.kind_name();
        let prev = store.get_state();
        tracing::debug!(action = name, payload = %action.to_json(), "Dispatching");

        let started = Instant::now();
        let result = next.run(action);
        let elapsed = started.elapsed();

        match &result {
            Ok(outcome) => tracing::debug!(
                action = name,
                ?outcome,
                ?elapsed,
                prev = ?prev,
                next = ?store.get_state(),
                "Dispatched"
            ),
            Err(e) => tracing::debug!(action = name, ?elapsed, error = %e, "Dispatch failed"),
        }
        result
    }
}

/// Writes the state to storage once dispatches go quiet.
///
/// The stored value is the state's JSON object, restricted to `whitelist`
/// when one is set, then without the fields in `blacklist`.
pub struct PersistenceMiddleware {
    storage: Arc<dyn StorageAdapter>,
    key: String,
    whitelist: Option<HashSet<String>>,
    blacklist: HashSet<String>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl PersistenceMiddleware {
    pub const DEFAULT_KEY: &'static str = "app_state";
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            key: Self::DEFAULT_KEY.to_string(),
            whitelist: None,
            blacklist: HashSet::new(),
            debounce: Self::DEFAULT_DEBOUNCE,
            pending: Mutex::new(None),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_whitelist<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Some(type_set(fields));
        self
    }

    pub fn with_blacklist<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = type_set(fields);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// The value that would be written for `state`.
    pub fn persisted_value(&self, state: &AppState) -> Value {
        filter_fields(state, self.whitelist.as_ref(), &self.blacklist)
    }
}

fn filter_fields(
    state: &AppState,
    whitelist: Option<&HashSet<String>>,
    blacklist: &HashSet<String>,
) -> Value {
    let mut value = serde_json::to_value(state).unwrap_or(Value::Null);
    if let Value::Object(fields) = &mut value {
        if let Some(whitelist) = whitelist {
            fields.retain(|name, _| whitelist.contains(name));
        }
        fields.retain(|name, _| !blacklist.contains(name));
    }
    value
}

impl Middleware for PersistenceMiddleware {
    fn handle(&self, store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        let runtime = runtime()?;
        let outcome = next.run(action)?;
        if outcome != Dispatched::Applied {
            return Ok(outcome);
        }

        let store = store.clone();
        let storage = Arc::clone(&self.storage);
        let key = self.key.clone();
        let whitelist = self.whitelist.clone();
        let blacklist = self.blacklist.clone();
        let debounce = self.debounce;

        let mut pending = lock(&self.pending);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            let value = filter_fields(&store.get_state(), whitelist.as_ref(), &blacklist);
            match storage.set(&key, &value).await {
                Ok(_) => tracing::debug!(key = %key, "Persisted state"),
                Err(e) => tracing::error!(key = %key, error = %e, "Failed to persist state"),
            }
        }));
        Ok(outcome)
    }
}

/// Drops listed actions that arrive within `delay` of the last accepted one
/// of the same type.
pub struct ThrottleMiddleware {
    types: HashSet<String>,
    delay: Duration,
    accepted: Mutex<HashMap<&'static str, tokio::time::Instant>>,
}

impl ThrottleMiddleware {
    pub fn new<I, S>(types: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: type_set(types),
            delay,
            accepted: Mutex::new(HashMap::new()),
        }
    }
}

impl Middleware for ThrottleMiddleware {
    fn handle(&self, _store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        let name = action.kind_name();
        if !self.types.contains(name) {
            return next.run(action);
        }

        let now = tokio::time::Instant::now();
        {
            let mut accepted = lock(&self.accepted);
            if let Some(last) = accepted.get(name) {
                if now.duration_since(*last) < self.delay {
                    tracing::debug!(action = name, "Throttled");
                    return Ok(Dispatched::Dropped);
                }
            }
            accepted.insert(name, now);
        }
        next.run(action)
    }
}

/// Holds listed actions until `delay` passes without another action of the
/// same type. Only the last one is applied.
pub struct DebounceMiddleware {
    types: HashSet<String>,
    delay: Duration,
    pending: Arc<Mutex<Timers>>,
    generation: Mutex<u64>,
}

impl DebounceMiddleware {
    pub fn new<I, S>(types: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: type_set(types),
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: Mutex::new(0),
        }
    }
}

impl Middleware for DebounceMiddleware {
    fn handle(&self, _store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        let name = action.kind_name();
        if !self.types.contains(name) {
            return next.run(action);
        }
        let runtime = runtime()?;

        let delay = self.delay;
        let pending = Arc::clone(&self.pending);

        let mut timers = lock(&self.pending);
        let generation = {
            let mut generation = lock(&self.generation);
            *generation += 1;
            *generation
        };
        if let Some((_, previous)) = timers.remove(name) {
            previous.abort();
        }
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // A timer past its sleep can no longer be aborted
            if !claim_timer(&mut lock(&pending), name, generation) {
                return;
            }
            if let Err(e) = next.resume(action) {
                tracing::error!(action = name, error = %e, "Debounced dispatch failed");
            }
        });
        timers.insert(name, (generation, handle));
        Ok(Dispatched::Deferred)
    }
}

type Timers = HashMap<&'static str, (u64, JoinHandle<()>)>;

/// Removes the timer for `name` if it is still `generation`.
fn claim_timer(timers: &mut Timers, name: &str, generation: u64) -> bool {
    if timers.get(name).map(|(g, _)| *g) != Some(generation) {
        return false;
    }
    timers.remove(name);
    true
}

type Rule = Box<dyn Fn(Action, &AppState) -> Result<Action, String> + Send + Sync>;

/// Per-type checks run against the current state. A rule returns the action
/// to continue with, possibly changed, or a rejection reason.
#[derive(Default)]
pub struct ValidationMiddleware {
    rules: HashMap<String, Rule>,
}

impl ValidationMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, action_type: impl Into<String>, rule: F) -> Self
    where
        F: Fn(Action, &AppState) -> Result<Action, String> + Send + Sync + 'static,
    {
        self.rules.insert(action_type.into(), Box::new(rule));
        self
    }
}

impl Middleware for ValidationMiddleware {
    fn handle(&self, store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        let name = action.kind_name();
        let Some(rule) = self.rules.get(name) else {
            return next.run(action);
        };
        match rule(action, &store.get_state()) {
            Ok(action) => next.run(action),
            Err(reason) => {
                tracing::warn!(action = name, reason = %reason, "Action rejected");
                Err(StateError::Rejected {
                    action: name.to_string(),
                    reason,
                })
            }
        }
    }
}

type Transform = Box<dyn Fn(Action) -> Action + Send + Sync>;

/// Rewrites listed actions before they reach the reducer.
#[derive(Default)]
pub struct TransformMiddleware {
    transforms: HashMap<String, Transform>,
}

impl TransformMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform<F>(mut self, action_type: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Action) -> Action + Send + Sync + 'static,
    {
        self.transforms.insert(action_type.into(), Box::new(transform));
        self
    }
}

impl Middleware for TransformMiddleware {
    fn handle(&self, _store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        match self.transforms.get(action.kind_name()) {
            Some(transform) => next.run(transform(action)),
            None => next.run(action),
        }
    }
}

type ErrorHandler = Box<dyn Fn(&StateError, &Action, &Store) + Send + Sync>;

/// Reports errors from the rest of the chain, then returns them unchanged.
#[derive(Default)]
pub struct ErrorMiddleware {
    handler: Option<ErrorHandler>,
}

impl ErrorMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&StateError, &Action, &Store) + Send + Sync + 'static,
    {
        Self {
            handler: Some(Box::new(handler)),
        }
    }
}

impl Middleware for ErrorMiddleware {
    fn handle(&self, store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        let snapshot = action.clone();
        let result = next.run(action);
        if let Err(e) = &result {
            match &self.handler {
                Some(handler) => handler(e, &snapshot, store),
                None => {
                    tracing::error!(action = snapshot.kind_name(), error = %e, "Dispatch failed")
                }
            }
        }
        result
    }
}

type SlowHandler = Box<dyn Fn(&Action, Duration) + Send + Sync>;

/// Reports actions whose dispatch takes longer than `threshold`.
pub struct TimingMiddleware {
    threshold: Duration,
    on_slow: Option<SlowHandler>,
}

impl TimingMiddleware {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            on_slow: None,
        }
    }

    pub fn on_slow<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Action, Duration) + Send + Sync + 'static,
    {
        self.on_slow = Some(Box::new(handler));
        self
    }
}

impl Middleware for TimingMiddleware {
    fn handle(&self, _store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        let snapshot = action.clone();
        let started = Instant::now();
        let result = next.run(action);
        let elapsed = started.elapsed();
        if elapsed >= self.threshold {
            match &self.on_slow {
                Some(handler) => handler(&snapshot, elapsed),
                None => tracing::warn!(action = snapshot.kind_name(), ?elapsed, "Slow action"),
            }
        }
        result
    }
}

type Queue = Arc<Mutex<Vec<(Action, Next)>>>;

/// Queues actions and applies them in order once `delay` passes without a
/// new one. Actions with `meta.batch == Some(false)` skip the queue.
pub struct BatchMiddleware {
    delay: Duration,
    queue: Queue,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl BatchMiddleware {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            queue: Arc::new(Mutex::new(Vec::new())),
            timer: Mutex::new(None),
        }
    }

    /// Number of actions waiting for the next flush.
    pub fn queued(&self) -> usize {
        lock(&self.queue).len()
    }
}

impl Middleware for BatchMiddleware {
    fn handle(&self, _store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        if action.meta.batch == Some(false) {
            return next.run(action);
        }
        let runtime = runtime()?;

        lock(&self.queue).push((action, next));

        let delay = self.delay;
        let queue = Arc::clone(&self.queue);
        let mut timer = lock(&self.timer);
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        *timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let batch = std::mem::take(&mut *lock(&queue));
            tracing::debug!(size = batch.len(), "Flushing batch");
            for (action, next) in batch {
                let name = action.kind_name();
                if let Err(e) = next.resume(action) {
                    tracing::error!(action = name, error = %e, "Batched dispatch failed");
                }
            }
        }));
        Ok(Dispatched::Deferred)
    }
}

/// Several middleware run as one, in the given order.
#[derive(Clone)]
pub struct ComposedMiddleware {
    chain: Arc<Vec<Arc<dyn Middleware>>>,
}

impl Middleware for ComposedMiddleware {
    fn handle(&self, _store: &Store, next: Next, action: Action) -> Result<Dispatched, StateError> {
        Next::nested(Arc::clone(&self.chain), next).run(action)
    }
}

pub fn compose(middleware: Vec<Arc<dyn Middleware>>) -> ComposedMiddleware {
    ComposedMiddleware {
        chain: Arc::new(middleware),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{actions, ActionKind, ReducerError};
    use crate::storage::{self, MemoryStorage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_store() -> (Store, Arc<Mutex<Vec<Action>>>) {
        let store = Store::with_root_reducer(AppState::default());
        let applied = Arc::new(Mutex::new(Vec::new()));
        let seen = applied.clone();
        store.subscribe(move |_, _, action| {
            seen.lock().unwrap().push(action.clone());
            Ok(())
        });
        (store, applied)
    }

    struct CountingStorage {
        inner: MemoryStorage,
        sets: AtomicUsize,
    }

    #[async_trait]
    impl StorageAdapter for CountingStorage {
        async fn get(&self, key: &str) -> storage::Result<Option<Value>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &Value) -> storage::Result<bool> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> storage::Result<bool> {
            self.inner.remove(key).await
        }

        async fn keys(&self) -> storage::Result<Vec<String>> {
            self.inner.keys().await
        }
    }

    #[test]
    fn test_closure_middleware_sees_actions() {
        let (store, applied) = counted_store();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        store.add_middleware(move |_: &Store, next: Next, action: Action| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(action)
        });

        store.dispatch(actions::set_weight(70.0)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(applied.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_middleware_can_drop() {
        let (store, applied) = counted_store();
        store.add_middleware(|_: &Store, _: Next, _: Action| Ok(Dispatched::Dropped));

        assert_eq!(
            store.dispatch(actions::set_weight(70.0)).unwrap(),
            Dispatched::Dropped
        );
        assert!(applied.lock().unwrap().is_empty());
        assert_eq!(store.get_state().weight, AppState::default().weight);
    }

    #[test]
    fn test_logging_passes_through() {
        let (store, applied) = counted_store();
        store.add_middleware(LoggingMiddleware);
        store.dispatch(actions::set_weight(70.0)).unwrap();
        assert_eq!(applied.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_compose_runs_in_order() {
        let (store, _) = counted_store();
        let order = Arc::new(Mutex::new(Vec::new()));

        let tag = |label: &'static str| -> Arc<dyn Middleware> {
            let order = order.clone();
            Arc::new(move |_: &Store, next: Next, action: Action| {
                order.lock().unwrap().push(label);
                next.run(action)
            })
        };
        store.add_middleware(compose(vec![tag("a"), tag("b")]));
        let c = tag("c");
        store.add_middleware(move |s: &Store, next: Next, action: Action| c.handle(s, next, action));

        store.dispatch(actions::set_weight(70.0)).unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(store.get_state().weight, 70.0);
    }

    #[test]
    fn test_validation_rejects_and_transforms() {
        let (store, applied) = counted_store();
        store.add_middleware(ValidationMiddleware::new().rule(
            "SET_WEIGHT",
            |action, _state| match action.kind {
                ActionKind::SetWeight(w) if w <= 0.0 => Err("weight must be positive".into()),
                ActionKind::SetWeight(w) => Ok(ActionKind::SetWeight(w.min(500.0)).into()),
                _ => Ok(action),
            },
        ));

        let err = store.dispatch(actions::set_weight(-1.0)).unwrap_err();
        assert!(matches!(err, StateError::Rejected { ref action, .. } if action == "SET_WEIGHT"));
        assert!(applied.lock().unwrap().is_empty());

        store.dispatch(actions::set_weight(900.0)).unwrap();
        assert_eq!(store.get_state().weight, 500.0);

        // other types are untouched
        store.dispatch(actions::set_active_tab("stats")).unwrap();
        assert_eq!(store.get_state().active_tab, "stats");
    }

    #[test]
    fn test_transform() {
        let (store, _) = counted_store();
        store.add_middleware(TransformMiddleware::new().transform("SET_ACTIVE_TAB", |action| {
            match action.kind {
                ActionKind::SetActiveTab(tab) => {
                    ActionKind::SetActiveTab(tab.to_lowercase()).into()
                }
                _ => action,
            }
        }));
        store.dispatch(actions::set_active_tab("STATS")).unwrap();
        assert_eq!(store.get_state().active_tab, "stats");
    }

    #[test]
    fn test_error_handler_sees_reducer_failure() {
        let (store, _) = counted_store();
        let reported = Arc::new(Mutex::new(Vec::new()));
        let seen = reported.clone();
        store.add_middleware(ErrorMiddleware::with_handler(move |error, action, _| {
            seen.lock()
                .unwrap()
                .push((action.kind_name(), matches!(error, StateError::Reducer(_))));
        }));

        let err = store
            .dispatch(actions::log_set("pushup", 100, 0.0, 10.0, actions::today()))
            .unwrap_err();
        assert!(matches!(
            err,
            StateError::Reducer(ReducerError::SetIndexOutOfRange { index: 100, .. })
        ));
        assert_eq!(*reported.lock().unwrap(), vec![("LOG_SET", true)]);

        store.dispatch(actions::set_weight(70.0)).unwrap();
        assert_eq!(reported.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_timing_reports_slow_actions() {
        let (store, _) = counted_store();
        let slow = Arc::new(Mutex::new(Vec::new()));
        let seen = slow.clone();
        store.add_middleware(
            TimingMiddleware::new(Duration::ZERO)
                .on_slow(move |action, _| seen.lock().unwrap().push(action.kind_name())),
        );
        store.dispatch(actions::set_weight(70.0)).unwrap();
        assert_eq!(*slow.lock().unwrap(), vec!["SET_WEIGHT"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_drops_bursts() {
        let delay = Duration::from_millis(100);
        let (store, applied) = counted_store();
        store.add_middleware(ThrottleMiddleware::new(["SET_WEIGHT"], delay));

        let mut dropped = 0;
        for i in 0..10 {
            let result = store.dispatch(actions::set_weight(60.0 + i as f64)).unwrap();
            if result == Dispatched::Dropped {
                dropped += 1;
            }
            tokio::time::advance(delay / 20).await;
        }
        assert_eq!(dropped, 9);
        assert_eq!(applied.lock().unwrap().len(), 1);
        assert_eq!(store.get_state().weight, 60.0);

        tokio::time::advance(delay).await;
        store.dispatch(actions::set_weight(80.0)).unwrap();
        assert_eq!(store.get_state().weight, 80.0);

        // unlisted types are never throttled
        store.dispatch(actions::set_active_tab("a")).unwrap();
        store.dispatch(actions::set_active_tab("b")).unwrap();
        assert_eq!(store.get_state().active_tab, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_applies_last_payload_once() {
        let delay = Duration::from_millis(100);
        let (store, applied) = counted_store();
        store.add_middleware(DebounceMiddleware::new(["SET_WEIGHT"], delay));

        for i in 0..5 {
            assert_eq!(
                store.dispatch(actions::set_weight(60.0 + i as f64)).unwrap(),
                Dispatched::Deferred
            );
            tokio::time::advance(delay / 4).await;
        }
        assert!(applied.lock().unwrap().is_empty());

        tokio::time::sleep(delay * 2).await;
        let applied = applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].kind, ActionKind::SetWeight(64.0));
        assert_eq!(store.get_state().weight, 64.0);
    }

    #[tokio::test]
    async fn test_superseded_timer_does_not_claim() {
        let mut timers = Timers::new();
        timers.insert("SET_WEIGHT", (2, tokio::spawn(async {})));

        assert!(!claim_timer(&mut timers, "SET_WEIGHT", 1));
        assert!(timers.contains_key("SET_WEIGHT"));
        assert!(claim_timer(&mut timers, "SET_WEIGHT", 2));
        assert!(!claim_timer(&mut timers, "SET_WEIGHT", 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_flushes_in_order() {
        let delay = Duration::from_millis(50);
        let (store, applied) = counted_store();
        let batch = Arc::new(BatchMiddleware::new(delay));
        store.add_middleware({
            let batch = batch.clone();
            move |store: &Store, next: Next, action: Action| batch.handle(store, next, action)
        });

        for i in 0..3 {
            assert_eq!(
                store.dispatch(actions::set_weight(60.0 + i as f64)).unwrap(),
                Dispatched::Deferred
            );
        }
        assert_eq!(batch.queued(), 3);

        store
            .dispatch(actions::set_active_tab("stats").with_batch(false))
            .unwrap();
        assert_eq!(applied.lock().unwrap().len(), 1);

        tokio::time::sleep(delay * 2).await;
        let names: Vec<_> = applied
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.kind.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                ActionKind::SetActiveTab("stats".into()),
                ActionKind::SetWeight(60.0),
                ActionKind::SetWeight(61.0),
                ActionKind::SetWeight(62.0),
            ]
        );
        assert_eq!(batch.queued(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_coalesces_writes() {
        let storage = Arc::new(CountingStorage {
            inner: MemoryStorage::new(),
            sets: AtomicUsize::new(0),
        });
        let store = Store::with_root_reducer(AppState::default());
        store.add_middleware(PersistenceMiddleware::new(storage.clone()));

        for i in 0..5 {
            store.dispatch(actions::set_weight(60.0 + i as f64)).unwrap();
            tokio::time::advance(Duration::from_millis(10)).await;
        }
        assert_eq!(storage.sets.load(Ordering::SeqCst), 0);

        tokio::time::sleep(PersistenceMiddleware::DEFAULT_DEBOUNCE * 2).await;
        assert_eq!(storage.sets.load(Ordering::SeqCst), 1);

        let saved = storage.get("app_state").await.unwrap().unwrap();
        assert_eq!(saved["weight"], 64.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistence_filters_fields() {
        let storage = Arc::new(MemoryStorage::new());
        let store = Store::with_root_reducer(AppState::default());
        store.add_middleware(
            PersistenceMiddleware::new(storage.clone())
                .with_key("filtered")
                .with_whitelist(["weight", "activeTab", "streak"])
                .with_blacklist(["activeTab"])
                .with_debounce(Duration::from_millis(10)),
        );

        store.dispatch(actions::set_weight(70.0)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let saved = storage.get("filtered").await.unwrap().unwrap();
        let fields: Vec<_> = saved.as_object().unwrap().keys().cloned().collect();
        assert_eq!(fields, vec!["streak", "weight"]);
    }

    #[test]
    fn test_timed_middleware_need_runtime() {
        let store = Store::with_root_reducer(AppState::default());
        store.add_middleware(PersistenceMiddleware::new(Arc::new(MemoryStorage::new())));

        assert!(matches!(
            store.dispatch(actions::set_weight(70.0)),
            Err(StateError::NoRuntime)
        ));
        assert_eq!(store.get_state().weight, AppState::default().weight);

        let store = Store::with_root_reducer(AppState::default());
        store.add_middleware(DebounceMiddleware::new(["SET_WEIGHT"], Duration::from_millis(10)));
        assert!(matches!(
            store.dispatch(actions::set_weight(70.0)),
            Err(StateError::NoRuntime)
        ));
    }
}
