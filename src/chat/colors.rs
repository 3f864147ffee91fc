//! Minecraft `§` color escape handling.
//!
//! Chat text carries inline color codes of the form `§<hex digit>`. They can
//! be removed entirely or rewritten into IRC color control codes for relay
//! targets that render colors.

use std::borrow::Cow;
use std::sync::LazyLock;

use fancy_regex::{Captures, Regex};

/// Section sign that starts every color escape.
pub const COLOR_MARKER: char = '\u{00A7}';

static COLOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{00A7}([0-9a-f])").expect("color pattern is valid"));

/// Minecraft color digit to IRC control code. `f` (white) resets formatting.
const IRC_COLORS: [(char, &str); 16] = [
    ('0', "\x0301"),
    ('1', "\x0302"),
    ('2', "\x0303"),
    ('3', "\x0310"),
    ('4', "\x0304"),
    ('5', "\x0306"),
    ('6', "\x0308"),
    ('7', "\x0315"),
    ('8', "\x0314"),
    ('9', "\x0312"),
    ('a', "\x0309"),
    ('b', "\x0311"),
    ('c', "\x0304"),
    ('d', "\x0313"),
    ('e', "\x0308"),
    ('f', "\x0F"),
];

/// Remove every color escape from `text`.
///
/// Runs until no escape is left, so removing one escape cannot expose
/// another (`§§aa` strips to the empty string).
pub fn strip_colors(text: &str) -> Cow<'_, str> {
    let mut current = Cow::Borrowed(text);
    while current.contains(COLOR_MARKER) {
        let stripped = match COLOR_PATTERN.replace_all(&current, "") {
            Cow::Borrowed(_) => break,
            Cow::Owned(stripped) => stripped,
        };
        current = Cow::Owned(stripped);
    }
    current
}

/// Rewrite every color escape in `text` into its IRC equivalent.
pub fn translate_colors(text: &str) -> Cow<'_, str> {
    if !text.contains(COLOR_MARKER) {
        return Cow::Borrowed(text);
    }
    COLOR_PATTERN.replace_all(text, |caps: &Captures<'_>| {
        caps.get(1)
            .and_then(|digit| digit.as_str().chars().next())
            .map(irc_code)
            .unwrap_or("")
            .to_string()
    })
}

fn irc_code(digit: char) -> &'static str {
    IRC_COLORS
        .iter()
        .find(|(d, _)| *d == digit)
        .map(|(_, code)| *code)
        .unwrap_or("")
}
