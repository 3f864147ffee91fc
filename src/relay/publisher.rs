//! Publish sink abstraction.

use std::sync::Arc;

use tracing::debug;

/// A fire-and-forget publish/subscribe sink.
///
/// Delivery is at most once; failures are handled (and logged) by the
/// implementation, never reported to the caller.
pub trait Publisher: Send + Sync {
    fn publish(&self, channel: &str, message: &str);
}

/// Publishes relayed chat for one server onto its channel.
#[derive(Clone)]
pub struct Relay {
    channel: String,
    publisher: Arc<dyn Publisher>,
}

impl Relay {
    pub fn new(channel: impl Into<String>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            channel: channel.into(),
            publisher,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Publish one accepted message. Empty text is not published.
    pub fn publish(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        debug!("Publishing to {}: {:?}", self.channel, text);
        self.publisher.publish(&self.channel, text);
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay").field("channel", &self.channel).finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingPublisher;
    use super::*;

    #[test]
    fn test_publish_to_channel() {
        let recorder = Arc::new(RecordingPublisher::default());
        let relay = Relay::new("mcrelay:survival", recorder.clone());

        relay.publish("<Steve> hi");
        relay.publish("<Alex> hello");

        assert_eq!(
            recorder.published(),
            vec![
                ("mcrelay:survival".to_string(), "<Steve> hi".to_string()),
                ("mcrelay:survival".to_string(), "<Alex> hello".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_text_not_published() {
        let recorder = Arc::new(RecordingPublisher::default());
        let relay = Relay::new("mcrelay:survival", recorder.clone());

        relay.publish("");

        assert!(recorder.published().is_empty());
    }
}
