//! Heading anchor id computation (§4.3 "Heading anchor ids"), ported from
//! the teacher's `html/anchorizer.rs` for the `ext-anchor-links` mode, with
//! a sibling free function for the simpler non-extended `anchor-links`
//! mode the spec also describes.

use std::borrow::Cow;
use std::collections::HashSet;

/// Converts heading text to canonical, unique anchors for the
/// `ext-anchor-links` extension: keep letters/digits (lowercased), collapse
/// runs of anything else to a single `-`. Tracks anchors already issued so
/// repeats get a numeric suffix, matching the teacher's `Anchorizer`.
#[derive(Debug, Default)]
pub struct Anchorizer(HashSet<String>);

impl Anchorizer {
    pub fn new() -> Self {
        Anchorizer(HashSet::new())
    }

    pub fn anchorize(&mut self, header: &str) -> String {
        let mut id = String::with_capacity(header.len());
        let mut in_run = false;
        for c in header.chars() {
            if c.is_alphanumeric() {
                id.extend(c.to_lowercase());
                in_run = false;
            } else if !in_run && !id.is_empty() {
                id.push('-');
                in_run = true;
            }
        }
        while id.ends_with('-') {
            id.pop();
        }

        let mut uniq = 0;
        let unique_id = loop {
            let candidate = if uniq == 0 {
                Cow::from(&id)
            } else {
                Cow::from(format!("{}-{}", id, uniq))
            };
            if !self.0.contains(candidate.as_ref()) {
                break candidate.into_owned();
            }
            uniq += 1;
        };
        self.0.insert(unique_id.clone());
        unique_id
    }
}

/// The non-extended `anchor-links` mode: the first contiguous
/// alphanumeric-and-space range of the heading text, with internal spaces
/// collapsed to single `-` joins (§4.3).
pub fn simple_anchor(header: &str) -> String {
    let range: String = header
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == ' ')
        .collect();
    range.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchorize_is_unique() {
        let mut a = Anchorizer::new();
        assert_eq!(a.anchorize("Stuff"), "stuff");
        assert_eq!(a.anchorize("Stuff"), "stuff-1");
    }

    #[test]
    fn anchorize_collapses_punctuation() {
        let mut a = Anchorizer::new();
        assert_eq!(a.anchorize("Ticks aren't in"), "ticks-aren-t-in");
    }

    #[test]
    fn simple_anchor_stops_at_first_non_alnum_space() {
        assert_eq!(simple_anchor("Hello, World"), "Hello");
    }
}
