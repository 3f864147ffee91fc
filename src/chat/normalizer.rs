//! Chat component normalization.
//!
//! Chat packets carry a JSON component. A component is either literal
//! (`{"text": "..."}`) or a translation (`{"translate": key, "with": [..]}`)
//! whose template comes from the localization catalog. Both forms may carry
//! `extra` children that are appended in order.

use std::sync::{Arc, LazyLock};

use fancy_regex::Regex;
use serde_json::{Map, Value};

use crate::chat::catalog::LocalizationCatalog;
use crate::common::error::NormalizeError;

/// Matches `%%`, `%s` and `%<n>$s`.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%|%(?:(\d+)\$)?s").expect("placeholder pattern is valid")
});

/// Turns raw chat payloads into plain text.
#[derive(Debug, Clone)]
pub struct MessageNormalizer {
    catalog: Arc<LocalizationCatalog>,
}

impl MessageNormalizer {
    pub fn new(catalog: Arc<LocalizationCatalog>) -> Self {
        Self { catalog }
    }

    /// Decode a JSON chat payload and resolve it to text.
    ///
    /// Color escapes are left in place.
    pub fn normalize(&self, raw: &[u8]) -> Result<String, NormalizeError> {
        let value: Value = serde_json::from_slice(raw).map_err(|e| malformed(e.to_string()))?;
        match value {
            Value::Object(component) => self.render_component(&component),
            Value::String(text) => Ok(text),
            other => Err(malformed(format!(
                "expected an object or string, got {}",
                type_name(&other)
            ))),
        }
    }

    fn render_component(&self, component: &Map<String, Value>) -> Result<String, NormalizeError> {
        let mut out = match component.get("translate") {
            Some(Value::String(key)) => self.translate(key, component)?,
            Some(other) => {
                return Err(malformed(format!(
                    "'translate' must be a string, got {}",
                    type_name(other)
                )))
            }
            None => match component.get("text") {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => {
                    return Err(malformed(format!(
                        "'text' must be a string, got {}",
                        type_name(other)
                    )))
                }
            },
        };

        match component.get("extra") {
            Some(Value::Array(children)) => {
                for child in children {
                    out.push_str(&self.render_value(child)?);
                }
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                return Err(malformed(format!(
                    "'extra' must be an array, got {}",
                    type_name(other)
                )))
            }
        }

        Ok(out)
    }

    fn translate(&self, key: &str, component: &Map<String, Value>) -> Result<String, NormalizeError> {
        let template = self
            .catalog
            .get(key)
            .ok_or_else(|| NormalizeError::UnknownTranslationKey {
                key: key.to_string(),
            })?;

        let arguments = match component.get("with").or_else(|| component.get("using")) {
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| self.render_value(value))
                .collect::<Result<Vec<_>, _>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(malformed(format!(
                    "translation arguments must be an array, got {}",
                    type_name(other)
                )))
            }
        };

        substitute(key, template, &arguments)
    }

    /// Render a translation argument or `extra` child.
    fn render_value(&self, value: &Value) -> Result<String, NormalizeError> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Null => Ok(String::new()),
            Value::Object(component) => self.render_component(component),
            Value::Array(_) => Err(malformed("nested arrays are not chat components")),
        }
    }
}

/// Replace placeholders in `template` with `arguments`.
///
/// `%<n>$s` is 1-indexed. Bare `%s` consumes arguments in order and `%%`
/// renders a literal percent sign.
pub fn substitute(key: &str, template: &str, arguments: &[String]) -> Result<String, NormalizeError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    let mut next_sequential = 0;

    for caps in PLACEHOLDER_PATTERN.captures_iter(template) {
        let caps = caps.map_err(|e| malformed(e.to_string()))?;
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        last = whole.end();

        if whole.as_str() == "%%" {
            out.push('%');
            continue;
        }

        // Zero-based position of the argument this placeholder refers to.
        let (index, position) = match caps.get(1) {
            Some(digits) => {
                let index = digits.as_str().parse::<usize>().unwrap_or(usize::MAX);
                (index, index.checked_sub(1))
            }
            None => {
                next_sequential += 1;
                (next_sequential, Some(next_sequential - 1))
            }
        };

        match position.and_then(|p| arguments.get(p)) {
            Some(argument) => out.push_str(argument),
            None => {
                return Err(NormalizeError::ArgumentIndexOutOfRange {
                    key: key.to_string(),
                    index,
                    count: arguments.len(),
                })
            }
        }
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn malformed(message: impl Into<String>) -> NormalizeError {
    NormalizeError::MalformedPayload {
        message: message.into(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
