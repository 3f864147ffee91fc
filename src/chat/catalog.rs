//! Localization catalog.
//!
//! Parses the game's flat `key=template` language file once at start-up.
//! The catalog is read-only afterwards and shared between sessions.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::common::error::CatalogError;

/// Immutable translation key to template mapping.
#[derive(Debug, Clone, Default)]
pub struct LocalizationCatalog {
    entries: HashMap<String, String>,
}

impl LocalizationCatalog {
    /// Parse `key=template` lines.
    ///
    /// Blank lines and lines starting with `#` or `!` are ignored. The key is
    /// trimmed and the template is everything after the first `=` with
    /// leading whitespace removed. Later duplicates win.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();

        for (line_no, raw) in content.lines().enumerate() {
            let line = raw.trim_start_matches('\u{FEFF}').trim_end_matches('\r');
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            match trimmed.split_once('=') {
                Some((key, template)) => {
                    let key = key.trim();
                    if key.is_empty() {
                        debug!("Skipping localization line {} with empty key", line_no + 1);
                        continue;
                    }
                    entries.insert(key.to_string(), template.trim_start().to_string());
                }
                None => {
                    debug!("Skipping localization line {} without '='", line_no + 1);
                }
            }
        }

        Self { entries }
    }

    /// Read and parse a localization file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let catalog = Self::parse(&content);
        if catalog.is_empty() {
            warn!("Localization file {} has no entries", path.display());
        }
        info!(
            "Loaded {} localization entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for LocalizationCatalog
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_entries() {
        let catalog = LocalizationCatalog::parse(
            "chat.type.text=<%1$s> %2$s\nchat.type.emote=* %1$s %2$s\n",
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("chat.type.text"), Some("<%1$s> %2$s"));
        assert_eq!(catalog.get("chat.type.emote"), Some("* %1$s %2$s"));
        assert_eq!(catalog.get("missing"), None);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let catalog = LocalizationCatalog::parse(
            "# comment\n! also a comment\n\n   \nmultiplayer.player.joined=%s joined the game\n",
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("multiplayer.player.joined"),
            Some("%s joined the game")
        );
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        let catalog = LocalizationCatalog::parse("math.eq = a=b\r\n");
        assert_eq!(catalog.get("math.eq"), Some("a=b"));
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let catalog = LocalizationCatalog::parse("no separator here\n=empty key\nok=1\n");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("ok"), Some("1"));
    }

    #[test]
    fn test_later_duplicates_win() {
        let catalog = LocalizationCatalog::parse("k=first\nk=second\n");
        assert_eq!(catalog.get("k"), Some("second"));
    }

    #[test]
    fn test_parse_strips_bom() {
        let catalog = LocalizationCatalog::parse("\u{FEFF}death.fell=%1$s fell\n");
        assert_eq!(catalog.get("death.fell"), Some("%1$s fell"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = LocalizationCatalog::load("/nonexistent/en_US.lang");
        assert!(matches!(result, Err(CatalogError::IoError { .. })));
    }
}
