//! Query state as seen by a consumer, and latest-only result tracking.

use crate::errors::Error;
use crate::query::key::QueryKey;
use std::sync::Arc;
use tracing::debug;

/// Where a query currently stands.
#[derive(Debug)]
pub enum QueryState<T> {
    /// Not started, or disabled (e.g. a detail query with no id)
    Idle,
    Loading,
    Success(Arc<T>),
    Error(Arc<Error>),
}

// Manual impl: cloning only bumps reference counts, so `T` need not be `Clone`.
impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading => Self::Loading,
            Self::Success(data) => Self::Success(Arc::clone(data)),
            Self::Error(error) => Self::Error(Arc::clone(error)),
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> QueryState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<Error>> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> From<Result<Arc<T>, Arc<Error>>> for QueryState<T> {
    fn from(result: Result<Arc<T>, Arc<Error>>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Error(error),
        }
    }
}

/// Handed out by [`QueryObserver::begin`] and returned with the result it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    key: QueryKey,
}

impl Ticket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Tracks the state of the most recently requested key.
///
/// Every `begin` supersedes the previous request. A result is applied only if its ticket is
/// the latest one; anything older is dropped so a slow response cannot overwrite fresher state.
#[derive(Debug)]
pub struct QueryObserver<T> {
    generation: u64,
    current: Option<QueryKey>,
    state: QueryState<T>,
}

impl<T> Default for QueryObserver<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
            state: QueryState::Idle,
        }
    }
}

impl<T> QueryObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &QueryState<T> {
        &self.state
    }

    pub fn current_key(&self) -> Option<&QueryKey> {
        self.current.as_ref()
    }

    /// Start tracking `key`; the state moves to `Loading`.
    pub fn begin(&mut self, key: QueryKey) -> Ticket {
        self.generation += 1;
        self.current = Some(key.clone());
        self.state = QueryState::Loading;
        Ticket {
            generation: self.generation,
            key,
        }
    }

    /// Apply a finished request. Returns false when the ticket has been superseded.
    pub fn settle(&mut self, ticket: &Ticket, result: Result<Arc<T>, Arc<Error>>) -> bool {
        if ticket.generation != self.generation {
            debug!(key = %ticket.key, "Discarding superseded result");
            return false;
        }
        self.state = QueryState::from(result);
        true
    }

    /// Back to `Idle`; any outstanding ticket becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.current = None;
        self.state = QueryState::Idle;
    }
}
