use super::{AlertRule, RuleContext};
use crate::models::{AlertCandidate, AlertLevel, AlertSource};

/// Flags from the remote-imagery classifier: disease, weak vegetation
/// health, anomaly clusters. Produces nothing when imagery did not
/// contribute to this invocation.
pub struct ImageryHealthRule;

const LOW_HEALTH_SCORE: f64 = 0.4;
const ANOMALY_CAUTION_COUNT: u32 = 5;

impl AlertRule for ImageryHealthRule {
    fn id(&self) -> &'static str {
        "imagery_health"
    }

    fn name(&self) -> &'static str {
        "Imagery Health"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<AlertCandidate> {
        let Some(imagery) = ctx.imagery else {
            return Vec::new();
        };

        let mut candidates = Vec::new();

        if imagery.disease_detected {
            candidates.push(AlertCandidate::new(
                AlertSource::Imagery,
                "disease",
                AlertLevel::Critical,
                format!(
                    "Disease signature detected ({:.0}% confidence)",
                    imagery.disease_confidence * 100.0
                ),
            ));
        }

        if imagery.health_score < LOW_HEALTH_SCORE {
            candidates.push(AlertCandidate::new(
                AlertSource::Imagery,
                "vegetation_health",
                AlertLevel::Warning,
                format!(
                    "Imagery health score {:.2} indicates weak vegetation",
                    imagery.health_score
                ),
            ));
        }

        if imagery.anomaly_count >= ANOMALY_CAUTION_COUNT {
            candidates.push(AlertCandidate::new(
                AlertSource::Imagery,
                "anomalies",
                AlertLevel::Caution,
                format!("{} anomalous regions flagged in imagery", imagery.anomaly_count),
            ));
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageryResult, MapSummary};

    fn summary() -> MapSummary {
        MapSummary {
            mean_health: 0.7,
            health_std_dev: 0.1,
            min_health: 0.4,
            max_health: 0.9,
            healthy_percent: 70.0,
            critical_percent: 2.0,
            stressed_percent: 28.0,
            waterlogged_percent: 0.0,
        }
    }

    fn ctx_with<'a>(imagery: Option<&'a ImageryResult>, map: &'a MapSummary) -> RuleContext<'a> {
        RuleContext {
            reading: None,
            imagery,
            stress: None,
            fused_score: 0.7,
            map,
            overall_confidence: 0.9,
        }
    }

    fn healthy_imagery() -> ImageryResult {
        ImageryResult {
            health_score: 0.8,
            disease_detected: false,
            disease_confidence: 0.0,
            vegetation_index: 0.6,
            anomaly_count: 0,
            confidence: Some(0.9),
        }
    }

    #[test]
    fn disease_renders_confidence_percentage() {
        let map = summary();
        let mut imagery = healthy_imagery();
        imagery.disease_detected = true;
        imagery.disease_confidence = 0.9;
        let candidates = ImageryHealthRule.evaluate(&ctx_with(Some(&imagery), &map));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].level, AlertLevel::Critical);
        assert!(candidates[0].message.contains("90"));
    }

    #[test]
    fn low_health_score_warns() {
        let map = summary();
        let mut imagery = healthy_imagery();
        imagery.health_score = 0.3;
        let candidates = ImageryHealthRule.evaluate(&ctx_with(Some(&imagery), &map));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].level, AlertLevel::Warning);
    }

    #[test]
    fn anomaly_cluster_is_caution() {
        let map = summary();
        let mut imagery = healthy_imagery();
        imagery.anomaly_count = 7;
        let candidates = ImageryHealthRule.evaluate(&ctx_with(Some(&imagery), &map));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].level, AlertLevel::Caution);
    }

    #[test]
    fn absent_imagery_skips_the_rule() {
        let map = summary();
        assert!(ImageryHealthRule.evaluate(&ctx_with(None, &map)).is_empty());
    }
}
