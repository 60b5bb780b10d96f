use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Outbound "post created" announcement. Delivery and ordering guarantees
/// belong to the subscribing collaborator, not this engine; emission is
/// fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostCreated {
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    /// The reposter when the announcement comes from a repost.
    pub(crate) reposter_id: Option<i64>,
}

#[async_trait]
pub(crate) trait PostNotifier: Send + Sync {
    async fn post_created(&self, event: PostCreated);
}

/// In-process fan-out over a tokio broadcast channel. The real-time
/// delivery layer subscribes via [`BroadcastNotifier::subscribe`].
pub(crate) struct BroadcastNotifier {
    tx: broadcast::Sender<PostCreated>,
}

impl BroadcastNotifier {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PostCreated> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl PostNotifier for BroadcastNotifier {
    async fn post_created(&self, event: PostCreated) {
        // A send error only means nobody is subscribed right now.
        if self.tx.send(event.clone()).is_err() {
            debug!(post_id = event.post_id, "post-created event had no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BroadcastNotifier, PostCreated, PostNotifier};

    #[tokio::test]
    async fn subscriber_receives_post_created_event() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier
            .post_created(PostCreated {
                post_id: 1,
                author_id: 10,
                reposter_id: None,
            })
            .await;

        let event = rx.recv().await.expect("event must arrive");
        assert_eq!(event.post_id, 1);
        assert_eq!(event.author_id, 10);
    }

    #[tokio::test]
    async fn emission_without_subscribers_is_a_no_op() {
        let notifier = BroadcastNotifier::new(8);
        notifier
            .post_created(PostCreated {
                post_id: 1,
                author_id: 10,
                reposter_id: Some(20),
            })
            .await;
    }
}
