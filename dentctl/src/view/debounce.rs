//! Debounced text input.
//!
//! The raw value follows every keystroke. The committed value changes only once the input has been
//! quiet for the configured window. One timer task exists at a time: each keystroke aborts it and
//! starts a new one, and dropping the debouncer aborts it for good.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Raw input differs from what will be committed, or a timer is still running
    PendingInput,
    Committed,
}

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    raw: String,
    timer: Option<JoinHandle<()>>,
    committed: Arc<watch::Sender<String>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        let (committed, _) = watch::channel(String::new());
        Self {
            quiet,
            raw: String::new(),
            timer: None,
            committed: Arc::new(committed),
        }
    }

    /// Record a keystroke and restart the quiet-period timer.
    pub fn input(&mut self, text: impl Into<String>) {
        self.raw = text.into();
        self.cancel();

        let committed = Arc::clone(&self.committed);
        let value = self.raw.clone();
        let quiet = self.quiet;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            trace!(%value, "Committing debounced input");
            publish(&committed, value);
        }));
    }

    /// Commit the raw value now (e.g. on Enter).
    pub fn flush(&mut self) {
        self.cancel();
        publish(&self.committed, self.raw.clone());
    }

    /// Stop any running timer; the committed value stays as it is.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn committed(&self) -> String {
        self.committed.borrow().clone()
    }

    pub fn state(&self) -> DebounceState {
        let running = self.timer.as_ref().is_some_and(|timer| !timer.is_finished());
        if running || *self.committed.borrow() != self.raw {
            DebounceState::PendingInput
        } else {
            DebounceState::Committed
        }
    }

    /// Receive committed values. Only actual changes are published.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.committed.subscribe()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn publish(committed: &watch::Sender<String>, value: String) {
    committed.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}
