use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

use super::middleware::Middleware;
use super::reducers::root_reducer;
use super::{Action, ReducerError, StateError};
use crate::models::AppState;

/// Pure state transition.
pub type Reducer = Arc<dyn Fn(&AppState, &Action) -> Result<AppState, ReducerError> + Send + Sync>;

/// What a listener returns. Errors are logged and never stop other listeners.
pub type ListenerResult = Result<(), Box<dyn Error + Send + Sync>>;

type Listener = Arc<dyn Fn(&AppState, &AppState, &Action) -> ListenerResult + Send + Sync>;

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The reducer ran and listeners were notified.
    Applied,
    /// A middleware discarded the action.
    Dropped,
    /// A middleware scheduled the action to run later.
    Deferred,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Inner {
    state: RwLock<AppState>,
    reducer: RwLock<Reducer>,
    middleware: RwLock<Vec<Arc<dyn Middleware>>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    dispatch_lock: Mutex<()>,
    dispatching: Mutex<Option<ThreadId>>,
}

/// Single-owner state container.
///
/// `Store` is a cheap handle; clones share the same state. Dispatches are
/// serialized: the dispatch window covers middleware, the reducer and
/// listener notification. A dispatch from inside that window on the same
/// thread fails with [`StateError::Reentrant`]; dispatches from other
/// threads wait for the window to close.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.read().unwrap_or_else(PoisonError::into_inner))
            .finish_non_exhaustive()
    }
}

/// Holds the dispatch window open until dropped.
pub(crate) struct DispatchWindow<'a> {
    store: &'a Store,
    _serial: MutexGuard<'a, ()>,
}

impl Drop for DispatchWindow<'_> {
    fn drop(&mut self) {
        *lock(&self.store.inner.dispatching) = None;
    }
}

impl Store {
    pub fn new<R>(initial: AppState, reducer: R) -> Self
    where
        R: Fn(&AppState, &Action) -> Result<AppState, ReducerError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(initial),
                reducer: RwLock::new(Arc::new(reducer)),
                middleware: RwLock::new(Vec::new()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                dispatch_lock: Mutex::new(()),
                dispatching: Mutex::new(None),
            }),
        }
    }

    /// A store driven by [`root_reducer`].
    pub fn with_root_reducer(initial: AppState) -> Self {
        Self::new(initial, root_reducer)
    }

    /// Returns a copy of the current state.
    pub fn get_state(&self) -> AppState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn select<T>(&self, selector: impl FnOnce(&AppState) -> T) -> T {
        selector(&self.inner.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Runs `action` through the middleware chain and the reducer.
    pub fn dispatch(&self, action: Action) -> Result<Dispatched, StateError> {
        let _window = self.enter()?;
        let chain = Arc::new(
            self.inner
                .middleware
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        );
        Next::new(self.clone(), chain).run(action)
    }

    /// Parses a `{ type, payload }` object and dispatches it.
    pub fn dispatch_json(&self, value: serde_json::Value) -> Result<Dispatched, StateError> {
        self.dispatch(Action::from_json(value)?)
    }

    pub(crate) fn enter(&self) -> Result<DispatchWindow<'_>, StateError> {
        let me = thread::current().id();
        if *lock(&self.inner.dispatching) == Some(me) {
            return Err(StateError::Reentrant);
        }
        let serial = lock(&self.inner.dispatch_lock);
        *lock(&self.inner.dispatching) = Some(me);
        Ok(DispatchWindow {
            store: self,
            _serial: serial,
        })
    }

    /// The end of every middleware chain.
    pub(crate) fn apply(&self, action: Action) -> Result<Dispatched, StateError> {
        let prev = self.get_state();
        let reducer = self
            .inner
            .reducer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let next = match reducer(&prev, &action) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(action = action.kind_name(), error = %e, "Reducer failed");
                return Err(StateError::Reducer(e));
            }
        };

        *self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next.clone();
        self.notify(&prev, &next, &action);
        Ok(Dispatched::Applied)
    }

    fn notify(&self, prev: &AppState, next: &AppState, action: &Action) {
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            if let Err(e) = listener(prev, next, action) {
                tracing::error!(action = action.kind_name(), error = %e, "Listener failed");
            }
        }
    }

    /// Registers a listener called after every applied action with the
    /// previous state, the new state and the action.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState, &AppState, &Action) -> ListenerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Calls `callback(new, old, action)` only when `selector`'s result changes.
    pub fn subscribe_to<T, S, F>(&self, selector: S, callback: F) -> Subscription
    where
        T: PartialEq + Send + 'static,
        S: Fn(&AppState) -> T + Send + Sync + 'static,
        F: Fn(&T, &T, &Action) + Send + Sync + 'static,
    {
        let previous = Mutex::new(self.select(&selector));
        self.subscribe(move |_, next, action| {
            let value = selector(next);
            let mut previous = lock(&previous);
            if value != *previous {
                callback(&value, &previous, action);
                *previous = value;
            }
            Ok(())
        })
    }

    pub fn add_middleware<M: Middleware + 'static>(&self, middleware: M) -> &Self {
        self.inner
            .middleware
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(middleware));
        self
    }

    pub fn clear_middleware(&self) -> &Self {
        self.inner
            .middleware
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self
    }

    pub fn replace_reducer<R>(&self, reducer: R) -> &Self
    where
        R: Fn(&AppState, &Action) -> Result<AppState, ReducerError> + Send + Sync + 'static,
    {
        *self
            .inner
            .reducer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(reducer);
        self
    }

    /// Replaces the state without notifying listeners.
    pub fn reset(&self, state: AppState) -> &Self {
        *self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state;
        self
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping the handle leaves the listener registered.
#[derive(Debug)]
pub struct Subscription {
    store: Weak<Inner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner.listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

/// The rest of a middleware chain.
///
/// Calling [`Next::run`] passes the action to the next middleware, or to the
/// reducer at the end of the chain. A `Next` is cheap to clone and may be
/// moved into a timer task and finished later with [`Next::resume`].
#[derive(Clone)]
pub struct Next {
    store: Store,
    chain: Arc<Vec<Arc<dyn Middleware>>>,
    index: usize,
    tail: Option<Box<Next>>,
}

impl Next {
    pub(crate) fn new(store: Store, chain: Arc<Vec<Arc<dyn Middleware>>>) -> Self {
        Self {
            store,
            chain,
            index: 0,
            tail: None,
        }
    }

    /// A chain over `chain` that continues with `tail` when exhausted.
    pub(crate) fn nested(chain: Arc<Vec<Arc<dyn Middleware>>>, tail: Next) -> Self {
        Self {
            store: tail.store.clone(),
            chain,
            index: 0,
            tail: Some(Box::new(tail)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn run(self, action: Action) -> Result<Dispatched, StateError> {
        match self.chain.get(self.index).cloned() {
            Some(middleware) => {
                let store = self.store.clone();
                let next = Next {
                    index: self.index + 1,
                    ..self
                };
                middleware.handle(&store, next, action)
            }
            None => match self.tail {
                Some(tail) => tail.run(action),
                None => self.store.apply(action),
            },
        }
    }

    /// Reopens the dispatch window and continues the chain.
    ///
    /// Used by middleware that finish an action outside the original
    /// dispatch call.
    pub fn resume(self, action: Action) -> Result<Dispatched, StateError> {
        let store = self.store.clone();
        let _window = store.enter()?;
        self.run(action)
    }
}
