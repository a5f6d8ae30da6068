// Telemetry Stop Token

use std::sync::Arc;
use tokio::sync::watch;

/// Stop signal observed by the telemetry reporter
#[derive(Clone)]
pub struct StopToken {
    rx: watch::Receiver<bool>,
}

impl StopToken {
    /// Check if stop was requested
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the stop signal (returns at once if it already fired)
    pub async fn wait(&mut self) {
        // Sender gone means nobody can stop us any more; treat as stop
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

/// One-shot, idempotent stop trigger
#[derive(Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    /// Fire the signal. Returns true for the call that actually fired it,
    /// false for every later call.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Another token bound to this signal
    pub fn token(&self) -> StopToken {
        StopToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Create a stop channel
pub fn stop_channel() -> (StopSignal, StopToken) {
    let (tx, rx) = watch::channel(false);
    (StopSignal { tx: Arc::new(tx) }, StopToken { rx })
}
