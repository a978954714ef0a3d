//! Direction classification verdicts

use crate::direction::Direction;
use serde::{Deserialize, Serialize};

/// Fallback reason recorded when the model gives none
pub const REASON_NOT_PROVIDED: &str = "未提供说明";

/// The model's direction verdict for one document.
///
/// Produced once per document by the classification stage. The raw reply is
/// kept alongside the parsed values so reviewers can audit the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Resolved contract direction
    pub direction: Direction,

    /// Model confidence, clamped to [0.0, 1.0]
    pub confidence: f64,

    /// Short free-text justification
    pub reason: String,

    /// The model's unmodified reply text
    pub raw_response: String,
}

impl ClassificationResult {
    /// Build a verdict from parsed model output.
    ///
    /// Confidence is clamped into [0.0, 1.0] regardless of what the model
    /// returned; a blank reason is replaced with [`REASON_NOT_PROVIDED`].
    pub fn new(
        direction: Direction,
        confidence: f64,
        reason: impl Into<String>,
        raw_response: impl Into<String>,
    ) -> Self {
        let reason = reason.into();
        let reason = reason.trim().to_string();
        Self {
            direction,
            confidence: confidence.clamp(0.0, 1.0),
            reason: if reason.is_empty() {
                REASON_NOT_PROVIDED.to_string()
            } else {
                reason
            },
            raw_response: raw_response.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        let low = ClassificationResult::new(Direction::Upstream, -5.0, "r", "raw");
        assert_eq!(low.confidence, 0.0);

        let high = ClassificationResult::new(Direction::Downstream, 1.5, "r", "raw");
        assert_eq!(high.confidence, 1.0);

        let mid = ClassificationResult::new(Direction::Upstream, 0.82, "r", "raw");
        assert_eq!(mid.confidence, 0.82);
    }

    #[test]
    fn blank_reason_gets_placeholder() {
        let result = ClassificationResult::new(Direction::Upstream, 0.5, "  ", "raw");
        assert_eq!(result.reason, REASON_NOT_PROVIDED);

        let kept = ClassificationResult::new(Direction::Upstream, 0.5, " 授权取得 ", "raw");
        assert_eq!(kept.reason, "授权取得");
    }
}
