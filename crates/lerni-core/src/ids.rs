//! ID prefix constants.
//!
//! Every entity ID is `{prefix}-{8 hex chars}`, generated by the database
//! (see `LerniDb::generate_id`).

pub const PREFIX_CONCEPT: &str = "cpt";
pub const PREFIX_QUESTION: &str = "qst";
pub const PREFIX_ANSWER: &str = "ans";
pub const PREFIX_REVIEW: &str = "rev";

/// All prefixes, in entity declaration order.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_CONCEPT, PREFIX_QUESTION, PREFIX_ANSWER, PREFIX_REVIEW];

/// Returns `true` if `id` looks like `{prefix}-xxxxxxxx`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for prefix in ALL_PREFIXES {
            assert!(seen.insert(*prefix), "duplicate prefix {prefix}");
        }
    }

    #[test]
    fn has_prefix_checks_shape() {
        assert!(has_prefix("qst-a3f8b2c1", PREFIX_QUESTION));
        assert!(!has_prefix("qst-", PREFIX_QUESTION));
        assert!(!has_prefix("qst-zz", PREFIX_QUESTION));
        assert!(!has_prefix("ans-a3f8b2c1", PREFIX_QUESTION));
        assert!(!has_prefix("Python", PREFIX_CONCEPT));
    }
}
