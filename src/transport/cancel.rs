//! Cooperative cancellation
//!
//! A shared signal another thread raises to make a pending call stop
//! waiting. Synchronous code polls it with `check`; the HTTP transport awaits
//! `cancelled` alongside the request so a stalled exchange wakes at once.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{ClientError, Result};

/// Cancellation signal shared between a client and whoever may interrupt it
#[derive(Debug, Clone)]
pub struct CancelToken {
    signal: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal: Arc::new(signal),
        }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask pending and future calls to stop waiting
    pub fn cancel(&self) {
        self.signal.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.signal.borrow()
    }

    /// Re-arm the token after an interruption was handled
    pub fn reset(&self) {
        self.signal.send_replace(false);
    }

    /// `Err(Interrupted)` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ClientError::Interrupted);
        }
        Ok(())
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        let mut receiver = self.signal.subscribe();
        // The sender lives as long as `self`, so waiting cannot fail
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}
