//! # Async Execution Bridge
//!
//! Runs blocking print work off the interactive thread and posts the
//! completion back to it.
//!
//! Each submission gets its own short-lived worker thread (print jobs are
//! infrequent; no pool). The worker never invokes caller callbacks itself:
//! it enqueues exactly one completion — success or failure — onto a channel
//! that the interactive thread drains, because downstream state mutation
//! (history append, UI refresh) is only safe there. Jobs are
//! fire-and-forget: there is no cancellation once submitted.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use tracing::debug;

use crate::error::EtiquetaError;

type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Completion queue between background workers and the interactive thread.
pub struct ExecBridge {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl ExecBridge {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Execute `work` on a dedicated background thread and return
    /// immediately.
    ///
    /// When the work finishes, exactly one of `on_success`/`on_failure` is
    /// queued for the interactive thread; a panicking worker is reported
    /// through `on_failure` rather than lost.
    pub fn submit<W, S, F>(&self, work: W, on_success: S, on_failure: F)
    where
        W: FnOnce() -> Result<(), EtiquetaError> + Send + 'static,
        S: FnOnce() + Send + 'static,
        F: FnOnce(EtiquetaError) + Send + 'static,
    {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|_| {
                Err(EtiquetaError::PrintOperation(
                    "background print worker panicked".to_string(),
                ))
            });

            let completion: Completion = match outcome {
                Ok(()) => Box::new(on_success),
                Err(e) => Box::new(move || on_failure(e)),
            };

            // Receiver gone means the interactive side shut down; the
            // completion has nowhere to go.
            if tx.send(completion).is_err() {
                debug!("completion dropped, bridge receiver closed");
            }
        });
    }

    /// Run all pending completions on the calling thread; returns how many
    /// ran. Non-blocking.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        while let Ok(completion) = self.rx.try_recv() {
            completion();
            ran += 1;
        }
        ran
    }

    /// Block until the next completion arrives and run it on the calling
    /// thread. Returns false when no worker can ever complete (all senders
    /// dropped).
    pub fn drain_blocking(&self) -> bool {
        match self.rx.recv() {
            Ok(completion) => {
                completion();
                true
            }
            Err(_) => false,
        }
    }
}

impl Default for ExecBridge {
    fn default() -> Self {
        Self::new()
    }
}
