//! Unidirectional state container: actions go through middleware to the
//! reducers, and listeners hear about every applied change.

mod action;
pub mod actions;
mod error;
pub mod middleware;
pub mod reducers;
mod store;

pub use action::{Action, ActionKind, ActionMeta, MentalProgressPatch};
pub use error::{ReducerError, StateError};
pub use middleware::{
    compose, BatchMiddleware, ComposedMiddleware, DebounceMiddleware, ErrorMiddleware,
    LoggingMiddleware, Middleware, PersistenceMiddleware, ThrottleMiddleware, TimingMiddleware,
    TransformMiddleware, ValidationMiddleware,
};
pub use reducers::{root_reducer, ReducerResult};
pub use store::{Dispatched, ListenerResult, Next, Reducer, Store, Subscription};
