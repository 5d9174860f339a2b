use crate::value::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Fingerprints are truncated to stay usable as map keys and pub/sub topic
/// names; the length is part of the public contract.
pub const FINGERPRINT_LEN: usize = 24;

/// Derive the stable fingerprint of a view's parameter list.
///
/// Entries are sorted by key, rendered `"{key}.{value}"`, joined with `":"`,
/// SHA-256 hashed, lowercase-hex encoded, and truncated to
/// [`FINGERPRINT_LEN`] characters.
#[must_use]
pub fn fingerprint(params: &[(String, Value)]) -> String {
    let mut sorted: Vec<&(String, Value)> = params.iter().collect();
    sorted.sort_by(|(left, _), (right, _)| left.cmp(right));

    let mut rendered = String::new();
    for (i, (key, value)) in sorted.iter().enumerate() {
        if i > 0 {
            rendered.push(':');
        }
        let _ = write!(rendered, "{key}.{value}");
    }

    let digest = Sha256::digest(rendered.as_bytes());

    let mut out = hex::encode(digest);
    out.truncate(FINGERPRINT_LEN);
    out
}

#[cfg(test)]
mod tests {
    use super::{FINGERPRINT_LEN, fingerprint};
    use crate::value::Value;

    fn params(entries: &[(&str, Value)]) -> Vec<(String, Value)> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn fingerprints_are_24_lowercase_hex_chars() {
        let fp = fingerprint(&params(&[("label", Value::text("Hospital Records"))]));
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let a = fingerprint(&params(&[
            ("label", Value::text("Hospital Records")),
            ("name", Value::text("Lo")),
        ]));
        let b = fingerprint(&params(&[
            ("name", Value::text("Lo")),
            ("label", Value::text("Hospital Records")),
        ]));
        assert_eq!(a, b);
    }

    #[test]
    fn different_parameters_fingerprint_differently() {
        let a = fingerprint(&params(&[("name", Value::text("Lo"))]));
        let b = fingerprint(&params(&[("name", Value::text("Hi"))]));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_parameter_lists_still_fingerprint() {
        let fp = fingerprint(&[]);
        assert_eq!(fp.len(), FINGERPRINT_LEN);
    }
}
