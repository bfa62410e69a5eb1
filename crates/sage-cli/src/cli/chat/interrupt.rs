//! Process-wide Ctrl+C listener.
//!
//! Installed once at startup so SIGINT never falls back to the default
//! handler. A child running in the foreground (shell passthrough) still
//! receives the signal from the terminal; Sage only records it. Waiters see
//! interrupts that arrive after they start waiting, never older ones.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Clone)]
pub struct InterruptWatch {
    count: Arc<watch::Sender<u64>>,
}

impl InterruptWatch {
    /// A watch with no signal source attached.
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// Take over SIGINT for the rest of the process.
    pub fn install() -> Self {
        let watch = Self::new();
        let listener = watch.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                listener.trigger();
            }
        });
        watch
    }

    pub fn trigger(&self) {
        self.count.send_modify(|n| *n += 1);
    }

    /// Resolve on the next interrupt.
    pub async fn interrupted(&self) {
        let mut rx = self.count.subscribe();
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_earlier_interrupt_is_not_replayed() {
        let watch = InterruptWatch::new();
        watch.trigger();

        let waited = tokio::time::timeout(Duration::from_millis(50), watch.interrupted()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_interrupt_while_waiting_resolves() {
        let watch = InterruptWatch::new();
        let trigger = watch.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(2), watch.interrupted())
            .await
            .unwrap();
    }
}
