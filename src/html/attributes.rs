//! The attributes builder (§4.4): an insertion-order-preserving map with
//! `class`-aware `add` and `\`/`"`-escaping on render. Grounded on the
//! teacher's `write_opening_tag` (`src/html.rs`), generalized into a
//! standalone ordered map since this crate's serializer builds attribute
//! sets incrementally rather than from a fixed iterator at print time.
//! `href`/`src` values never pass through here — every real link/image
//! site escapes those directly with [`crate::html::escape_href`], the
//! teacher's own `escape_href`, which percent-encodes the whole value
//! uniformly rather than splitting at `?`; see `DESIGN.md`.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Appends `value` to the existing value (space-delimited) if `key` is
    /// already present — the behavior `class` needs when multiple rules
    /// contribute classes to the same node — otherwise inserts a new entry.
    pub fn add(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1.push(' ');
            entry.1.push_str(value);
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    pub fn replace(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.entries
            .iter()
            .find(|(k, _)| k == "class")
            .map(|(_, v)| v.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Attributes {
    /// Renders as ` key="value" key2="value2"`, skipping `class` when its
    /// (trimmed) value is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            if key == "class" && value.trim().is_empty() {
                continue;
            }
            write!(f, " {}=\"{}\"", key, escape_attr(value))?;
        }
        Ok(())
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '\\' => out.push_str("\\\\"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes a URL path segment, used by the default wiki-link
/// renderer (§4.6).
pub fn percent_encode_path(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_for_class() {
        let mut a = Attributes::default();
        a.add("class", "foo");
        a.add("class", "bar");
        assert_eq!(a.get("class"), Some("foo bar"));
    }

    #[test]
    fn escapes_quotes_and_angle_brackets_in_values() {
        let mut a = Attributes::default();
        a.add("title", "a \"quoted\" <tag>");
        assert_eq!(a.to_string(), " title=\"a &quot;quoted&quot; &lt;tag&gt;\"");
    }
}
