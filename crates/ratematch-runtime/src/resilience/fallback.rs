//! What to do when message synthesis fails.

use serde::{Deserialize, Serialize};

/// Fallback strategy when the LLM call fails, times out, returns an
/// unusable message, or the circuit is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Fail the whole request with a generic error
    #[default]
    Fail,

    /// Use the deterministic template sentence for the field
    Template,
}

impl FallbackStrategy {
    pub fn uses_template(&self) -> bool {
        matches!(self, FallbackStrategy::Template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fail() {
        assert_eq!(FallbackStrategy::default(), FallbackStrategy::Fail);
        assert!(!FallbackStrategy::Fail.uses_template());
    }

    #[test]
    fn test_tagged_wire_format() {
        let strategy: FallbackStrategy =
            serde_json::from_value(serde_json::json!({"type": "template"})).unwrap();
        assert_eq!(strategy, FallbackStrategy::Template);
        assert_eq!(
            serde_json::to_value(FallbackStrategy::Fail).unwrap(),
            serde_json::json!({"type": "fail"})
        );
    }
}
