//! Host lifecycle: Starting -> Serving -> Stopping -> Stopped

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HostState {
    Starting,
    Serving,
    Stopping,
    Stopped,
}

impl HostState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostState::Starting => "starting",
            HostState::Serving => "serving",
            HostState::Stopping => "stopping",
            HostState::Stopped => "stopped",
        }
    }
}

/// Shared handle to the host state. Transitions only move forward.
#[derive(Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<HostState>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(HostState::Starting);
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> HostState {
        *self.tx.borrow()
    }

    pub fn serving(&self) -> bool {
        self.advance(HostState::Serving)
    }

    /// Stop accepting calls. Returns false if already stopping.
    pub fn begin_stopping(&self) -> bool {
        self.advance(HostState::Stopping)
    }

    pub fn stopped(&self) -> bool {
        self.advance(HostState::Stopped)
    }

    pub fn is_serving(&self) -> bool {
        self.state() == HostState::Serving
    }

    pub fn is_stopping(&self) -> bool {
        self.state() >= HostState::Stopping
    }

    /// Resolves once the host has started stopping.
    pub async fn stopping(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while waiting
        let _ = rx.wait_for(|state| *state >= HostState::Stopping).await;
    }

    fn advance(&self, next: HostState) -> bool {
        let moved = self.tx.send_if_modified(|state| {
            if *state < next {
                *state = next;
                true
            } else {
                false
            }
        });
        if moved {
            info!("Host state: {}", next.as_str());
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_forward_transitions() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), HostState::Starting);
        assert!(!lifecycle.is_stopping());

        assert!(lifecycle.serving());
        assert!(lifecycle.is_serving());

        assert!(lifecycle.begin_stopping());
        assert!(!lifecycle.begin_stopping());
        assert!(lifecycle.is_stopping());
        assert!(!lifecycle.serving());

        assert!(lifecycle.stopped());
        assert_eq!(lifecycle.state(), HostState::Stopped);
        assert!(lifecycle.is_stopping());
    }

    #[test]
    fn test_stop_before_serving() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.begin_stopping());
        assert!(!lifecycle.serving());
        assert_eq!(lifecycle.state().as_str(), "stopping");
    }

    #[tokio::test]
    async fn test_stopping_wakes_waiters() {
        let lifecycle = Lifecycle::new();
        lifecycle.serving();

        let waiter = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.stopping().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        lifecycle.begin_stopping();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_stopping_resolves_when_already_stopped() {
        let lifecycle = Lifecycle::new();
        lifecycle.begin_stopping();
        tokio::time::timeout(Duration::from_secs(1), lifecycle.stopping())
            .await
            .unwrap();
    }
}
