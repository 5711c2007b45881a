//! Minimal language server over stdio.
//!
//! Messages are JSON-RPC with `Content-Length` framing. Document changes and
//! saves are debounced per document before the text is parsed, persisted
//! and answered with diagnostics.

pub mod content;
pub mod controller;
pub mod debounce;
pub mod protocol;
pub mod rpc;
pub mod server;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use controller::{Controller, Flow};
pub use server::run;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
