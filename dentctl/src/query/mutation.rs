//! Write operations with observable progress.
//!
//! A mutation runs exactly one write and publishes `Idle -> Pending -> Success | Error` on a watch
//! channel. It never touches the query cache: after a successful write the caller decides which
//! queries to invalidate.

use crate::errors::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug)]
pub enum MutationState<T> {
    Idle,
    Pending,
    Success(Arc<T>),
    Error(Arc<Error>),
}

impl<T> Clone for MutationState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Pending => Self::Pending,
            Self::Success(data) => Self::Success(Arc::clone(data)),
            Self::Error(error) => Self::Error(Arc::clone(error)),
        }
    }
}

impl<T> MutationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&Arc<Error>> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Mutation<T> {
    state: watch::Sender<MutationState<T>>,
}

impl<T> Default for Mutation<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mutation<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self { state }
    }

    pub fn state(&self) -> MutationState<T> {
        self.state.borrow().clone()
    }

    /// Observe state transitions, e.g. to disable a submit button while pending.
    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.state.subscribe()
    }

    pub fn reset(&self) {
        self.state.send_replace(MutationState::Idle);
    }

    /// Run one write and record its outcome.
    pub async fn mutate<Fut>(&self, write: Fut) -> std::result::Result<Arc<T>, Arc<Error>>
    where
        Fut: Future<Output = Result<T>>,
    {
        self.state.send_replace(MutationState::Pending);
        match write.await {
            Ok(data) => {
                let data = Arc::new(data);
                self.state.send_replace(MutationState::Success(Arc::clone(&data)));
                Ok(data)
            }
            Err(error) => {
                let error = Arc::new(error);
                self.state.send_replace(MutationState::Error(Arc::clone(&error)));
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[tokio::test]
    async fn test_success_transitions() {
        let mutation = Mutation::<u32>::new();
        let mut rx = mutation.subscribe();
        assert!(matches!(mutation.state(), MutationState::Idle));

        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let write = async {
            gate.await.ok();
            Ok(3u32)
        };

        let run = mutation.mutate(write);
        tokio::pin!(run);

        // drive the mutation until it parks on the gate
        tokio::select! {
            _ = &mut run => panic!("write finished before release"),
            changed = rx.changed() => changed.unwrap(),
        }
        assert!(rx.borrow_and_update().is_pending());

        release.send(()).unwrap();
        let data = run.await.unwrap();
        assert_eq!(*data, 3);
        assert!(mutation.state().is_success());
    }

    #[tokio::test]
    async fn test_failure_is_recorded() {
        let mutation = Mutation::<u32>::new();
        let err = mutation
            .mutate(async {
                Err(Error::Status {
                    method: "DELETE".to_string(),
                    path: "/categories/nope".to_string(),
                    status: StatusCode::NOT_FOUND,
                    message: "Category not found".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(mutation.state().error().is_some_and(|e| e.is_not_found()));

        mutation.reset();
        assert!(matches!(mutation.state(), MutationState::Idle));
    }
}
