// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! GraphQL payload matcher
//!
//! Decides whether a request body names a blocked operation. Pure: no
//! logging, no I/O, no state carried between calls.

use serde::Serialize;
use serde_json::Value;

use super::config::BlockedOperationSet;

/// GraphQL field carrying the operation name
const OPERATION_NAME_FIELD: &str = "operationName";

/// Outcome of classifying one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterceptionDecision {
    /// At least one blocked operation was found
    pub matched: bool,
    /// Matched names in payload order, duplicates kept
    pub matched_names: Vec<String>,
}

impl InterceptionDecision {
    fn from_names(matched_names: Vec<String>) -> Self {
        Self {
            matched: !matched_names.is_empty(),
            matched_names,
        }
    }
}

/// Payload matcher over a blocked operation set
#[derive(Debug, Clone)]
pub struct Matcher {
    blocked: BlockedOperationSet,
}

impl Matcher {
    /// Create a matcher
    pub fn new(blocked: BlockedOperationSet) -> Self {
        Self { blocked }
    }

    /// Classify a raw payload
    ///
    /// JSON payloads are inspected structurally: an array is a batch and
    /// every element is a candidate, anything else is the sole candidate.
    /// Payloads that are not JSON fall back to a literal substring search
    /// for each blocked name.
    pub fn classify(&self, payload: impl AsRef<[u8]>) -> InterceptionDecision {
        let payload = payload.as_ref();
        if payload.is_empty() {
            return InterceptionDecision::default();
        }

        match serde_json::from_slice::<Value>(payload) {
            Ok(value) => self.classify_value(&value),
            Err(_) => self.classify_text(&String::from_utf8_lossy(payload)),
        }
    }

    /// Classify an already structured payload
    pub fn classify_value(&self, value: &Value) -> InterceptionDecision {
        let names = match value {
            Value::Array(operations) => operations
                .iter()
                .filter_map(|op| self.blocked_name(op))
                .collect(),
            single => self.blocked_name(single).into_iter().collect(),
        };
        InterceptionDecision::from_names(names)
    }

    /// Check whether a payload names a blocked operation
    pub fn is_blocked(&self, payload: impl AsRef<[u8]>) -> bool {
        self.classify(payload).matched
    }

    fn blocked_name(&self, operation: &Value) -> Option<String> {
        operation
            .get(OPERATION_NAME_FIELD)
            .and_then(Value::as_str)
            .filter(|name| self.blocked.contains(name))
            .map(String::from)
    }

    // Can report names that only appear inside unrelated string fields.
    fn classify_text(&self, text: &str) -> InterceptionDecision {
        let names = self
            .blocked
            .iter()
            .filter(|name| !name.is_empty() && text.contains(name))
            .map(String::from)
            .collect();
        InterceptionDecision::from_names(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> Matcher {
        Matcher::new(BlockedOperationSet::new(["B", "CLCSInterstitialLolomo"]))
    }

    #[test]
    fn test_single_object() {
        let decision = matcher().classify(r#"{"operationName":"CLCSInterstitialLolomo"}"#);
        assert!(decision.matched);
        assert_eq!(decision.matched_names, vec!["CLCSInterstitialLolomo"]);
    }

    #[test]
    fn test_batch_reports_only_blocked() {
        let decision =
            matcher().classify(r#"[{"operationName":"A"},{"operationName":"B"}]"#);
        assert!(decision.matched);
        assert_eq!(decision.matched_names, vec!["B"]);
    }

    #[test]
    fn test_batch_keeps_duplicates_in_order() {
        let decision = matcher().classify(
            r#"[{"operationName":"B"},{"operationName":"CLCSInterstitialLolomo"},{"operationName":"B"}]"#,
        );
        assert_eq!(decision.matched_names, vec!["B", "CLCSInterstitialLolomo", "B"]);
    }

    #[test]
    fn test_unblocked_operation() {
        let decision = matcher().classify(r#"{"operationName":"Search","variables":{}}"#);
        assert!(!decision.matched);
        assert!(decision.matched_names.is_empty());
    }

    #[test]
    fn test_fallback_substring() {
        let decision = matcher().classify("not json {{ CLCSInterstitialLolomo");
        assert!(decision.matched);
        assert_eq!(decision.matched_names, vec!["CLCSInterstitialLolomo"]);
    }

    #[test]
    fn test_fallback_without_name() {
        assert!(!matcher().is_blocked("not json {{"));
    }

    #[test]
    fn test_valid_json_does_not_fall_back() {
        // The name only appears in a string value, not as operationName
        let decision =
            matcher().classify(r#"{"operationName":"Other","query":"CLCSInterstitialLolomo"}"#);
        assert!(!decision.matched);
    }

    #[test]
    fn test_empty_and_missing_name() {
        let m = matcher();
        assert!(!m.is_blocked(""));
        assert!(!m.is_blocked("null"));
        assert!(!m.is_blocked("{}"));
        assert!(!m.is_blocked("[1, \"B\", null]"));
        assert!(!m.is_blocked(r#"{"operationName":42}"#));
    }

    #[test]
    fn test_non_utf8_falls_back() {
        let mut payload = vec![0xff, 0xfe];
        payload.extend_from_slice(b"CLCSInterstitialLolomo");
        assert!(matcher().is_blocked(payload));
    }

    #[test]
    fn test_classify_value() {
        let value = serde_json::json!([{ "operationName": "B" }]);
        assert_eq!(matcher().classify_value(&value).matched_names, vec!["B"]);
    }

    #[test]
    fn test_idempotent() {
        let m = matcher();
        let payload = r#"[{"operationName":"B"},{"operationName":"A"}]"#;
        assert_eq!(m.classify(payload), m.classify(payload));
    }
}
