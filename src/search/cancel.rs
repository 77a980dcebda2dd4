//! Cooperative cancellation for running searches

use crossbeam_channel::{Sender, after, bounded, select};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::debug;

/// Shared stop flag checked by the search after every candidate.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every holder of this token to stop.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Cancels a token once a timeout elapses.
///
/// Dropping the watchdog disarms it without touching the token.
#[derive(Debug)]
pub struct Watchdog {
    disarm: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Watchdog {
    pub fn spawn(token: CancellationToken, timeout: Duration) -> Self {
        let (disarm_tx, disarm_rx) = bounded::<()>(1);
        let handle = std::thread::spawn(move || {
            let deadline = after(timeout);
            select! {
                recv(deadline) -> _ => {
                    debug!(?timeout, "search timed out, cancelling");
                    token.cancel();
                }
                recv(disarm_rx) -> _ => {}
            }
        });
        Self {
            disarm: Some(disarm_tx),
            handle: Some(handle),
        }
    }

    /// Arm a watchdog only when a timeout is configured
    pub fn maybe_spawn(token: &CancellationToken, timeout: Option<Duration>) -> Option<Self> {
        timeout.map(|t| Self::spawn(token.clone(), t))
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        // Closing the channel wakes the watchdog thread.
        self.disarm.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
