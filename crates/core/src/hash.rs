use sha2::{Digest, Sha256};

/// Digest a sequence of fields as one record.
///
/// Fields are joined with `|` so that `("ab", "c")` and `("a", "bc")` differ.
pub fn record_digest<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_empty_field_is_sha256_of_nothing() {
        assert_eq!(
            record_digest([""]),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fields_are_joined_with_a_bar() {
        assert_eq!(record_digest(["a", "b"]), record_digest(["a|b"]));
    }

    #[test]
    fn record_digest_separates_fields() {
        assert_ne!(record_digest(["ab", "c"]), record_digest(["a", "bc"]));
    }

    #[test]
    fn record_digest_is_lowercase_hex() {
        let h = record_digest(["01-01-2023", "Test"]);
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
