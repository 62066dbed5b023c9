//! Hierarchical string keys (§4.9: "dot- or slash-separated").

/// Whether `key` falls under `prefix` in the hierarchy — either equal, or
/// `prefix` followed by a `.` or `/` boundary. A plain `starts_with` would
/// wrongly match `"Agent.30"` against the prefix `"Agent.3"`.
pub fn is_under_prefix(key: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    key == prefix
        || (key.len() > prefix.len()
            && key.starts_with(prefix)
            && matches!(key.as_bytes()[prefix.len()], b'.' | b'/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_counts_as_under_prefix() {
        assert!(is_under_prefix("Agent.3", "Agent.3"));
    }

    #[test]
    fn sibling_with_shared_string_prefix_does_not_match() {
        assert!(!is_under_prefix("Agent.30.Position", "Agent.3"));
    }

    #[test]
    fn child_key_matches() {
        assert!(is_under_prefix("Agent.3.Position", "Agent.3"));
        assert!(is_under_prefix("Agent/3/Position", "Agent/3"));
    }

    #[test]
    fn empty_prefix_matches_everything() {
        assert!(is_under_prefix("anything", ""));
    }
}
