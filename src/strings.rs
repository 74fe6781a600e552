//! String utilities, ported from the teacher's `strings.rs` and adapted to
//! operate on `&str`/`String` rather than byte vectors.

/// Reference-label normalization (§4.3): lowercase, strip spaces/tabs/
/// newlines. Idempotent (Testable property, §8).
pub fn normalize_reference_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_reference_label(" Foo BAR \n");
        let twice = normalize_reference_label(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_strips_whitespace_and_lowercases() {
        assert_eq!(normalize_reference_label("Foo Bar"), "foobar");
    }
}
