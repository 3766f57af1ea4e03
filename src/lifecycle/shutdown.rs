//! Shutdown coordination.

use std::sync::Arc;

use tokio::sync::watch;

use crate::lifecycle::signals;

/// Process-wide shutdown switch.
///
/// Triggering is sticky: a [`ShutdownSignal`] taken after the trigger resolves
/// immediately, so a server started late still drains instead of hanging.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

/// Resolves once the owning [`Shutdown`] is triggered or dropped.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Trigger on Ctrl-C or SIGTERM.
    pub fn trigger_on_os_signal(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            signals::wait_for_shutdown().await;
            shutdown.trigger();
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub async fn wait(mut self) {
        // A closed channel means every `Shutdown` handle is gone.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
