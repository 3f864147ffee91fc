//! Inbound chat processing: normalize, filter, prepare for publishing.

use tracing::{debug, info, warn};

use crate::chat::colors::{strip_colors, translate_colors};
use crate::chat::filter::NoiseFilter;
use crate::chat::normalizer::MessageNormalizer;
use crate::config::types::ColorMode;

/// Turns raw chat payloads into relay-ready text.
#[derive(Debug, Clone)]
pub struct ChatPipeline {
    normalizer: MessageNormalizer,
    filter: NoiseFilter,
    color_mode: ColorMode,
}

impl ChatPipeline {
    pub fn new(normalizer: MessageNormalizer, filter: NoiseFilter, color_mode: ColorMode) -> Self {
        Self {
            normalizer,
            filter,
            color_mode,
        }
    }

    /// Process one inbound chat payload.
    ///
    /// Returns the text to publish, or `None` if the message is dropped.
    /// Errors never escape: a message that cannot be normalized is dropped.
    pub fn process(&self, raw: &[u8]) -> Option<String> {
        let message = match self.normalizer.normalize(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping chat message: {}", e);
                return None;
            }
        };

        info!("<<< {}", message);

        if !self.filter.accept(&message) {
            debug!("Filtered chat message: {:?}", message);
            return None;
        }

        let relayed = match self.color_mode {
            ColorMode::Raw => message,
            ColorMode::Strip => strip_colors(&message).into_owned(),
            ColorMode::Irc => translate_colors(&message).into_owned(),
        };

        if relayed.is_empty() {
            None
        } else {
            Some(relayed)
        }
    }
}
