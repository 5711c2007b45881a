//! Keyed trailing-edge debouncing.
//!
//! Every call to [`Debouncer::schedule`] cancels the pending action with the
//! same key and starts a fresh quiescence window. Keys combine the reaction
//! kind with the document URI unless the scope is [`DebounceScope::Global`],
//! in which case all documents share one timer per kind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::DebounceScope;
use crate::lsp::lock;

type Action = Box<dyn FnOnce() + Send>;

/// The action is taken out of its slot by whoever runs it first: the timer
/// task or [`Debouncer::flush_all`].
type Slot = Arc<Mutex<Option<Action>>>;

struct Pending {
    handle: JoinHandle<()>,
    action: Slot,
}

pub struct Debouncer {
    window: Duration,
    scope: DebounceScope,
    pending: Mutex<HashMap<String, Pending>>,
}

impl Debouncer {
    pub fn new(window: Duration, scope: DebounceScope) -> Self {
        Self {
            window,
            scope,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, kind: &str, uri: &str) -> String {
        match self.scope {
            DebounceScope::Document => format!("{kind}:{uri}"),
            DebounceScope::Global => kind.to_string(),
        }
    }

    /// Runs `action` once `kind` has been quiet for the window on `uri`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, kind: &str, uri: &str, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let key = self.key(kind, uri);
        let window = self.window;
        let action: Action = Box::new(action);
        let slot: Slot = Arc::new(Mutex::new(Some(action)));

        let mut pending = lock(&self.pending);
        pending.retain(|_, waiting| !waiting.handle.is_finished());
        if let Some(previous) = pending.remove(&key) {
            previous.handle.abort();
            tracing::trace!(%key, "debounced");
        }
        let timer_slot = Arc::clone(&slot);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let action = lock(&timer_slot).take();
            if let Some(action) = action {
                action();
            }
        });
        pending.insert(key, Pending { handle, action: slot });
    }

    /// Number of actions still waiting.
    pub fn pending(&self) -> usize {
        let mut pending = lock(&self.pending);
        pending.retain(|_, waiting| !waiting.handle.is_finished());
        pending.len()
    }

    /// Runs every waiting action now, on the calling thread.
    ///
    /// Returns how many actions ran.
    pub fn flush_all(&self) -> usize {
        let drained: Vec<Pending> = lock(&self.pending).drain().map(|(_, waiting)| waiting).collect();
        let mut ran = 0;
        for waiting in drained {
            waiting.handle.abort();
            let action = lock(&waiting.action).take();
            if let Some(action) = action {
                action();
                ran += 1;
            }
        }
        if ran > 0 {
            tracing::debug!(ran, "flushed debounced actions");
        }
        ran
    }

    /// Drops every waiting action.
    pub fn cancel_all(&self) {
        for (_, waiting) in lock(&self.pending).drain() {
            waiting.handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
