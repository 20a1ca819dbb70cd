use super::{AlertRule, RuleContext};
use crate::models::{AlertCandidate, AlertLevel, AlertSource};

/// Flags from the stress-prediction model. Produces nothing when the model
/// did not contribute to this invocation.
pub struct StressForecastRule;

const STRESS_WARNING_LEVEL: f64 = 0.7;
const YIELD_IMPACT_CAUTION: f64 = 0.3;

impl AlertRule for StressForecastRule {
    fn id(&self) -> &'static str {
        "stress_forecast"
    }

    fn name(&self) -> &'static str {
        "Stress Forecast"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<AlertCandidate> {
        let Some(stress) = ctx.stress else {
            return Vec::new();
        };

        let mut candidates = Vec::new();

        if stress.stress_level > STRESS_WARNING_LEVEL {
            candidates.push(AlertCandidate::new(
                AlertSource::Stress,
                "stress_level",
                AlertLevel::Warning,
                format!(
                    "Predicted plant stress {:.0}% above tolerance",
                    stress.stress_level * 100.0
                ),
            ));
        }

        if stress.yield_impact > YIELD_IMPACT_CAUTION {
            candidates.push(AlertCandidate::new(
                AlertSource::Stress,
                "yield_impact",
                AlertLevel::Caution,
                format!(
                    "Projected yield impact {:.0}%",
                    stress.yield_impact * 100.0
                ),
            ));
        }

        candidates
    }
}
