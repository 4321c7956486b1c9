// ABOUTME: Regex-based extraction of hidden form inputs and the submit button from login HTML.
// ABOUTME: Best-effort scanning that degrades to empty results on malformed markup, never errors.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

static HIDDEN_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<input[^>]*type\s*=\s*["']hidden["'][^>]*>"#).unwrap());
static SUBMIT_INPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<input[^>]*type\s*=\s*["']submit["'][^>]*>"#).unwrap());
static NAME_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)name\s*=\s*(?:"([^"]+)"|'([^']+)')"#).unwrap());
static VALUE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)value\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Pull a single- or double-quoted attribute value out of a tag.
fn attr_value(re: &Regex, tag: &str) -> Option<String> {
    re.captures(tag).map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    })
}

/// Extract all `<input type="hidden">` fields from an HTML document.
///
/// Attributes may appear in any order and use either quote style. A tag
/// without a `name` cannot be submitted and is skipped; a missing `value`
/// defaults to the empty string. Malformed or empty input yields an empty
/// map. Tags seen later overwrite earlier tags with the same name.
///
/// This is deliberately a lightweight regex scan rather than a strict HTML
/// parse: the login form markup is not under this crate's control, and the
/// extractor must keep working across cosmetic changes to it.
pub fn extract_hidden_fields(html: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for tag_match in HIDDEN_INPUT_RE.find_iter(html) {
        let tag = tag_match.as_str();
        let Some(name) = attr_value(&NAME_ATTR_RE, tag) else {
            continue;
        };
        let value = attr_value(&VALUE_ATTR_RE, tag).unwrap_or_default();
        fields.insert(name, value);
    }
    fields
}

/// Extract the `name`/`value` pair of the first `<input type="submit">`.
///
/// ASP.NET forms only recognize a submit when the button's own field is
/// echoed back in the POST body, so the pair must come from the live markup
/// rather than a hardcoded guess. Returns `None` when the form carries no
/// named submit input.
pub fn extract_submit_button(html: &str) -> Option<(String, String)> {
    for tag_match in SUBMIT_INPUT_RE.find_iter(html) {
        let tag = tag_match.as_str();
        if let Some(name) = attr_value(&NAME_ATTR_RE, tag) {
            let value = attr_value(&VALUE_ATTR_RE, tag).unwrap_or_default();
            return Some((name, value));
        }
    }
    None
}
