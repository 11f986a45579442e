//! Process-wide termination signal.
//!
//! One [`ShutdownController`] is shared by the tasks allowed to hang up the
//! session; every worker holds a [`ShutdownSignal`] and pairs it with its
//! blocking point in a `select!`. Triggering is idempotent and reports
//! whether this call was the one that actually fired, so "terminated"
//! bookkeeping happens exactly once.

use tokio::sync::watch;

/// Shared handle that can fire the termination signal.
#[derive(Clone)]
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A fresh signal observing this controller.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fires the signal. Returns true only for the first caller.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    /// Completes once the signal has fired.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// A worker's view of the termination signal.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Completes once shutdown has been requested. Meant as a `select!` arm
    /// next to the worker's blocking point.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                // Controller gone without firing; treat that as shutdown.
                return;
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
