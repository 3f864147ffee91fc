//! Noise filtering with regex patterns.
//!
//! Decides whether normalized chat is worth relaying. Messages that already
//! went through another relay hop (`[Name -> Name]` headers) are dropped to
//! prevent relay loops, as are messages with no visible content.

use fancy_regex::Regex;
use tracing::warn;

use crate::chat::colors::strip_colors;
use crate::config::types::FiltersConfig;

/// Default pattern for messages echoed back by another relay.
pub const RELAY_ECHO_PATTERN: &str = r"\[[A-Za-z0-9_]{1,16} -> [A-Za-z0-9_]{1,16}\]";

/// Message filter that checks messages against regex patterns.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    /// Loop-prevention pattern.
    echo_pattern: CompiledPattern,
    /// Extra user-configured patterns.
    patterns: Vec<CompiledPattern>,
}

/// A compiled regex pattern with its source string.
#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text).unwrap_or_else(|e| {
            warn!("Regex match error for pattern '{}': {}", self.source, e);
            false
        })
    }
}

impl NoiseFilter {
    /// Create a filter with the built-in echo pattern and no extra patterns.
    pub fn new() -> Self {
        Self {
            echo_pattern: default_echo_pattern(),
            patterns: Vec::new(),
        }
    }

    /// Create a filter from configuration.
    ///
    /// An invalid echo pattern falls back to the default; invalid extra
    /// patterns are logged and skipped.
    pub fn from_config(filters: Option<&FiltersConfig>) -> Self {
        let Some(filters) = filters else {
            return Self::new();
        };

        let echo_pattern = match filters.relay_echo_pattern.as_deref().map(compile) {
            Some(Some(pattern)) => pattern,
            _ => default_echo_pattern(),
        };

        Self {
            echo_pattern,
            patterns: filters
                .patterns
                .iter()
                .flatten()
                .filter_map(|p| compile(p))
                .collect(),
        }
    }

    /// Returns `true` if `text` should be relayed.
    pub fn accept(&self, text: &str) -> bool {
        let visible = strip_colors(text);

        if self.echo_pattern.is_match(&visible) {
            return false;
        }

        if visible.chars().all(char::is_whitespace) {
            return false;
        }

        !self.patterns.iter().any(|p| p.is_match(&visible))
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn default_echo_pattern() -> CompiledPattern {
    CompiledPattern {
        source: RELAY_ECHO_PATTERN.to_string(),
        regex: Regex::new(RELAY_ECHO_PATTERN).expect("relay echo pattern is valid"),
    }
}

fn compile(pattern: &str) -> Option<CompiledPattern> {
    match Regex::new(pattern) {
        Ok(regex) => Some(CompiledPattern {
            source: pattern.to_string(),
            regex,
        }),
        Err(e) => {
            warn!("Invalid filter regex pattern '{}': {}", pattern, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_blank() {
        let filter = NoiseFilter::new();
        assert!(!filter.accept(""));
        assert!(!filter.accept("   "));
        assert!(!filter.accept("\t\n "));
    }

    #[test]
    fn test_rejects_color_only() {
        let filter = NoiseFilter::new();
        assert!(!filter.accept("§a§f"));
        assert!(!filter.accept("§a  §c "));
    }

    #[test]
    fn test_rejects_relay_echo() {
        let filter = NoiseFilter::new();
        assert!(!filter.accept("[Steve -> Alex] hi"));
        assert!(!filter.accept("§7[§aSteve§7 -> §bAlex§7] hi"));
        assert!(!filter.accept("prefix [some_bot_1 -> Player_2] text"));
    }

    #[test]
    fn test_echo_name_length_limits() {
        let filter = NoiseFilter::new();
        assert!(filter.accept("[ABCDEFGHIJKLMNOPQ -> Alex] seventeen chars"));
        assert!(filter.accept("[ -> Alex] empty name"));
        assert!(filter.accept("[Ste-ve -> Alex] dash"));
    }

    #[test]
    fn test_accepts_normal_chat() {
        let filter = NoiseFilter::new();
        assert!(filter.accept("hello world"));
        assert!(filter.accept("<Steve> [Alex] hi"));
        assert!(filter.accept("§aGreen text"));
    }

    #[test]
    fn test_extra_patterns() {
        let filter = NoiseFilter::from_config(Some(&FiltersConfig {
            relay_echo_pattern: None,
            patterns: Some(vec![
                "(?i)^\\[server\\]".to_string(),
                "[invalid".to_string(),
            ]),
        }));
        assert!(!filter.accept("[Server] Restarting"));
        assert!(!filter.accept("§c[SERVER] Restarting"));
        assert!(!filter.accept("[Steve -> Alex] hi"));
        assert!(filter.accept("Steve joined the game"));
    }

    #[test]
    fn test_custom_echo_pattern() {
        let filter = NoiseFilter::from_config(Some(&FiltersConfig {
            relay_echo_pattern: Some(r"^\(irc\)".to_string()),
            patterns: None,
        }));
        assert!(!filter.accept("(irc) relayed"));
        assert!(filter.accept("[Steve -> Alex] hi"));
    }

    #[test]
    fn test_invalid_echo_pattern_falls_back() {
        let filter = NoiseFilter::from_config(Some(&FiltersConfig {
            relay_echo_pattern: Some("(".to_string()),
            patterns: None,
        }));
        assert!(!filter.accept("[Steve -> Alex] hi"));
    }
}
