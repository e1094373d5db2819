use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::entities::Post;

const DEFAULT_CAPACITY: usize = 64;

/// Broadcast signals exchanged between otherwise-unrelated UI surfaces.
/// Delivery order is unspecified and listeners must tolerate duplicates.
#[derive(Debug, Clone)]
pub enum PostEvent {
    /// A full reload of the post list is requested.
    PostsUpdated,
    /// A post was just created on this client; carries the payload so lists
    /// can prepend it without a reload.
    ClientPostCreated(Post),
    /// The user picked an image file for a new post.
    PostFileSelected { path: String },
    /// A "Create Post" button asked the creator surface to open.
    OpenPostCreator,
    /// The creator surface asks whichever component owns the file picker to
    /// provide a file.
    RequestPostFile,
}

#[derive(Clone)]
pub struct PostEventBus {
    sender: broadcast::Sender<PostEvent>,
}

impl PostEventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishing never fails: with no active listeners the event is dropped,
    /// matching fire-and-forget broadcast semantics.
    pub fn publish(&self, event: PostEvent) {
        debug!(receivers = self.sender.receiver_count(), "publishing post event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PostEvent> {
        self.sender.subscribe()
    }
}

impl Default for PostEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn all_subscribers_receive_published_events() {
        let bus = PostEventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(PostEvent::PostsUpdated);

        assert!(matches!(first.recv().await.unwrap(), PostEvent::PostsUpdated));
        assert!(matches!(second.recv().await.unwrap(), PostEvent::PostsUpdated));
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let bus = PostEventBus::new();
        bus.publish(PostEvent::OpenPostCreator);
    }
}
