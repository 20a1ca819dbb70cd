use super::{AlertRule, RuleContext};
use crate::models::{AlertCandidate, AlertLevel, AlertSource};

/// Meta-alert on the fused confidence itself. Caps at Caution: weak inputs
/// are worth surfacing but never escalate the run on their own.
pub struct LowConfidenceRule;

const CONFIDENCE_CAUTION: f64 = 0.5;

impl AlertRule for LowConfidenceRule {
    fn id(&self) -> &'static str {
        "low_confidence"
    }

    fn name(&self) -> &'static str {
        "Low Confidence"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<AlertCandidate> {
        if ctx.overall_confidence < CONFIDENCE_CAUTION {
            vec![AlertCandidate::new(
                AlertSource::System,
                "confidence",
                AlertLevel::Caution,
                format!(
                    "Assessment confidence reduced to {:.0}%",
                    ctx.overall_confidence * 100.0
                ),
            )]
        } else {
            Vec::new()
        }
    }
}
