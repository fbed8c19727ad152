use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};

use common::ChatTransport;
use registry::SubscriberStore;

/// One recipient the broadcast could not reach.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    pub subscriber_id: String,
    pub error: String,
}

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: Vec<DeliveryFailure>,
}

/// Fan-out broadcaster over the enabled subscriber set.
///
/// Recipients are a snapshot taken at call time; an enable/disable that
/// lands mid-broadcast is not reflected until the next one. Failures are
/// isolated per recipient and never abort the pass. No retries here —
/// that is the transport's concern if it wants one.
pub struct NotificationDispatcher {
    store: Arc<SubscriberStore>,
    transport: Arc<dyn ChatTransport>,
    /// Bound on a single send, so one stalled recipient cannot pin the
    /// whole fan-out.
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<SubscriberStore>,
        transport: Arc<dyn ChatTransport>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            send_timeout,
        }
    }

    /// Deliver `text` to every currently-enabled subscriber.
    pub async fn broadcast(&self, text: &str) -> DispatchReport {
        let recipients = self.store.list_enabled().await;
        let mut report = DispatchReport::default();

        for sub in &recipients {
            match timeout(self.send_timeout, self.transport.send_text(&sub.id, text)).await {
                Ok(Ok(())) => report.sent += 1,
                Ok(Err(e)) => {
                    warn!(chat_id = %sub.id, error = %e, "Signal delivery failed");
                    report.failed.push(DeliveryFailure {
                        subscriber_id: sub.id.clone(),
                        error: e.to_string(),
                    });
                }
                Err(_) => {
                    warn!(chat_id = %sub.id, "Signal delivery timed out");
                    report.failed.push(DeliveryFailure {
                        subscriber_id: sub.id.clone(),
                        error: format!("send timed out after {:?}", self.send_timeout),
                    });
                }
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed.len(),
            "Broadcast complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::{Error, Result};
    use std::path::PathBuf;
    use tokio::sync::Mutex;

    /// Records every attempted send; fails for the configured chat ids.
    struct RecordingTransport {
        attempted: Mutex<Vec<String>>,
        fail_for: Vec<String>,
    }

    impl RecordingTransport {
        fn new(fail_for: &[&str]) -> Self {
            Self {
                attempted: Mutex::new(Vec::new()),
                fail_for: fail_for.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_text(&self, chat_id: &str, _text: &str) -> Result<()> {
            self.attempted.lock().await.push(chat_id.to_string());
            if self.fail_for.iter().any(|id| id == chat_id) {
                return Err(Error::Transport("forbidden: bot was blocked".to_string()));
            }
            Ok(())
        }
    }

    fn temp_store(tag: &str) -> (Arc<SubscriberStore>, PathBuf) {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let path = std::env::temp_dir().join(format!(
            "pipbot-dispatch-{tag}-{}-{nanos}.json",
            std::process::id()
        ));
        (Arc::new(SubscriberStore::load(&path)), path)
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_abort_the_rest() {
        let (store, path) = temp_store("isolate");
        for id in ["1", "2", "3"] {
            store.upsert(id, |_| {}).await.unwrap();
        }
        let transport = Arc::new(RecordingTransport::new(&["2"]));
        let dispatcher = NotificationDispatcher::new(
            store,
            transport.clone(),
            Duration::from_secs(1),
        );

        let report = dispatcher.broadcast("signal").await;

        assert_eq!(transport.attempted.lock().await.len(), 3);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].subscriber_id, "2");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn disabled_subscribers_are_skipped_until_reenabled() {
        let (store, path) = temp_store("toggle");
        store.upsert("10", |_| {}).await.unwrap();
        store.upsert("11", |_| {}).await.unwrap();
        store.set_enabled("10", false).await.unwrap();

        let transport = Arc::new(RecordingTransport::new(&[]));
        let dispatcher = NotificationDispatcher::new(
            store.clone(),
            transport.clone(),
            Duration::from_secs(1),
        );

        let report = dispatcher.broadcast("first").await;
        assert_eq!(report.sent, 1);
        assert_eq!(transport.attempted.lock().await.as_slice(), ["11"]);

        store.set_enabled("10", true).await.unwrap();
        let report = dispatcher.broadcast("second").await;
        assert_eq!(report.sent, 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn empty_registry_broadcast_is_a_clean_noop() {
        let (store, path) = temp_store("empty");
        let transport = Arc::new(RecordingTransport::new(&[]));
        let dispatcher =
            NotificationDispatcher::new(store, transport, Duration::from_secs(1));

        let report = dispatcher.broadcast("signal").await;
        assert_eq!(report.sent, 0);
        assert!(report.failed.is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
