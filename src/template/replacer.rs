use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use log::{debug, warn};
use regex::{Captures, Regex};

use super::TemplateRenderer;
use crate::error::Result;

/// Matches `{{{ key }}}` (raw) or `{{ key }}` (escaped)
const PLACEHOLDER_PATTERN: &str = r"\{\{\{\s*(?P<raw>[A-Za-z0-9_]+)\s*\}\}\}|\{\{\s*(?P<esc>[A-Za-z0-9_]+)\s*\}\}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// Fills `{{ key }}` markers in an HTML template.
///
/// Double braces insert the HTML-escaped value, triple braces insert it
/// verbatim. Markers without a value are left in place.
pub struct PlaceholderReplacer;

impl PlaceholderReplacer {
    pub fn new() -> Self {
        Self
    }

    /// Escapes HTML special characters and turns newlines into `<br>`
    fn escape_html(text: &str) -> String {
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#x27;");

        escaped.replace('\n', "<br>")
    }

    pub fn replace_all(&self, content: &str, replacements: &HashMap<String, String>) -> String {
        let mut used: HashSet<&str> = HashSet::new();

        let result = placeholder_regex().replace_all(content, |caps: &Captures| {
            let (key, raw) = match (caps.name("raw"), caps.name("esc")) {
                (Some(key), _) => (key.as_str(), true),
                (None, Some(key)) => (key.as_str(), false),
                (None, None) => return caps[0].to_string(),
            };

            match replacements.get_key_value(key) {
                Some((k, value)) => {
                    used.insert(k.as_str());
                    if raw {
                        value.clone()
                    } else {
                        Self::escape_html(value)
                    }
                }
                None => {
                    warn!("No value for placeholder '{}'", key);
                    caps[0].to_string()
                }
            }
        });

        for key in replacements.keys() {
            if !used.contains(key.as_str()) {
                debug!("Value '{}' not referenced by template", key);
            }
        }

        result.into_owned()
    }
}

impl Default for PlaceholderReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for PlaceholderReplacer {
    fn render(&self, source: &str, data: &HashMap<String, String>) -> Result<String> {
        Ok(self.replace_all(source, data))
    }
}
