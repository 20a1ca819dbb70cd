use super::{AlertRule, RuleContext};
use crate::models::{AlertCandidate, AlertLevel, AlertSource};

/// Area-percentage flags over the synthesized health map, plus a floor on
/// the fused score itself.
///
/// Healthy coverage below 40 % is critical and below 60 % warns; 60 % and
/// above stays quiet. Waterlogged and stressed coverage have their own
/// escalating bands.
pub struct MapAreaRule;

const HEALTHY_CRITICAL_PERCENT: f64 = 40.0;
const HEALTHY_WARNING_PERCENT: f64 = 60.0;

const WATERLOGGED_CRITICAL_PERCENT: f64 = 30.0;
const WATERLOGGED_WARNING_PERCENT: f64 = 15.0;

const STRESSED_WARNING_PERCENT: f64 = 60.0;

const FUSED_CRITICAL_SCORE: f64 = 0.2;

impl AlertRule for MapAreaRule {
    fn id(&self) -> &'static str {
        "map_areas"
    }

    fn name(&self) -> &'static str {
        "Map Area Coverage"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<AlertCandidate> {
        let mut candidates = Vec::new();
        let map = ctx.map;

        if map.healthy_percent < HEALTHY_CRITICAL_PERCENT {
            candidates.push(AlertCandidate::new(
                AlertSource::Map,
                "healthy_area",
                AlertLevel::Critical,
                format!(
                    "Healthy vegetation down to {:.0}% of field area",
                    map.healthy_percent
                ),
            ));
        } else if map.healthy_percent < HEALTHY_WARNING_PERCENT {
            candidates.push(AlertCandidate::new(
                AlertSource::Map,
                "healthy_area",
                AlertLevel::Warning,
                format!(
                    "Healthy vegetation at {:.0}% of field area",
                    map.healthy_percent
                ),
            ));
        }

        if map.waterlogged_percent > WATERLOGGED_CRITICAL_PERCENT {
            candidates.push(AlertCandidate::new(
                AlertSource::Map,
                "waterlogged_area",
                AlertLevel::Critical,
                format!(
                    "Waterlogging across {:.0}% of field area",
                    map.waterlogged_percent
                ),
            ));
        } else if map.waterlogged_percent > WATERLOGGED_WARNING_PERCENT {
            candidates.push(AlertCandidate::new(
                AlertSource::Map,
                "waterlogged_area",
                AlertLevel::Warning,
                format!(
                    "Waterlogging signs across {:.0}% of field area",
                    map.waterlogged_percent
                ),
            ));
        }

        if map.stressed_percent > STRESSED_WARNING_PERCENT {
            candidates.push(AlertCandidate::new(
                AlertSource::Map,
                "stressed_area",
                AlertLevel::Warning,
                format!(
                    "Stressed vegetation across {:.0}% of field area",
                    map.stressed_percent
                ),
            ));
        }

        if ctx.fused_score < FUSED_CRITICAL_SCORE {
            candidates.push(AlertCandidate::new(
                AlertSource::Map,
                "overall_health",
                AlertLevel::Critical,
                format!(
                    "Overall crop health critically degraded ({:.2})",
                    ctx.fused_score
                ),
            ));
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapSummary;

    fn summary_with_healthy(healthy_percent: f64) -> MapSummary {
        MapSummary {
            mean_health: 0.6,
            health_std_dev: 0.1,
            min_health: 0.2,
            max_health: 0.9,
            healthy_percent,
            critical_percent: 5.0,
            stressed_percent: 100.0 - healthy_percent,
            waterlogged_percent: 0.0,
        }
    }

    fn ctx<'a>(map: &'a MapSummary) -> RuleContext<'a> {
        RuleContext {
            reading: None,
            imagery: None,
            stress: None,
            fused_score: 0.6,
            map,
            overall_confidence: 0.9,
        }
    }

    #[test]
    fn thirty_five_percent_healthy_is_critical() {
        let map = summary_with_healthy(35.0);
        let candidates = MapAreaRule.evaluate(&ctx(&map));
        let healthy = candidates
            .iter()
            .find(|c| c.category == "healthy_area")
            .unwrap();
        assert_eq!(healthy.level, AlertLevel::Critical);
    }

    #[test]
    fn sixty_five_percent_healthy_fires_nothing_for_coverage() {
        let mut map = summary_with_healthy(65.0);
        map.stressed_percent = 35.0;
        let candidates = MapAreaRule.evaluate(&ctx(&map));
        assert!(candidates.iter().all(|c| c.category != "healthy_area"));
    }

    #[test]
    fn mid_band_healthy_warns() {
        let mut map = summary_with_healthy(50.0);
        map.stressed_percent = 50.0;
        let candidates = MapAreaRule.evaluate(&ctx(&map));
        let healthy = candidates
            .iter()
            .find(|c| c.category == "healthy_area")
            .unwrap();
        assert_eq!(healthy.level, AlertLevel::Warning);
    }

    #[test]
    fn collapsed_fused_score_is_critical() {
        let mut map = summary_with_healthy(70.0);
        map.stressed_percent = 10.0;
        let mut ctx = ctx(&map);
        ctx.fused_score = 0.15;
        let candidates = MapAreaRule.evaluate(&ctx);
        let overall = candidates
            .iter()
            .find(|c| c.category == "overall_health")
            .unwrap();
        assert_eq!(overall.level, AlertLevel::Critical);
    }

    #[test]
    fn waterlogging_bands_escalate() {
        let mut map = summary_with_healthy(70.0);
        map.stressed_percent = 10.0;

        map.waterlogged_percent = 20.0;
        let candidates = MapAreaRule.evaluate(&ctx(&map));
        assert_eq!(candidates[0].level, AlertLevel::Warning);

        map.waterlogged_percent = 40.0;
        let candidates = MapAreaRule.evaluate(&ctx(&map));
        assert_eq!(candidates[0].level, AlertLevel::Critical);
    }
}
