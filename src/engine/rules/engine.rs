use super::{
    confidence::LowConfidenceRule, imagery::ImageryHealthRule, map_area::MapAreaRule,
    stress::StressForecastRule, thresholds::SensorThresholdRule, AlertRule, RuleContext,
};
use crate::models::{
    AlertCandidate, AlertLevel, AlertResult, ALERT_CHAR_BUDGET, TRUNCATION_MARKER,
};

/// Evaluates the rule set and renders the single bounded alert message.
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertEngine {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn AlertRule>> = vec![
            Box::new(SensorThresholdRule),
            Box::new(ImageryHealthRule),
            Box::new(StressForecastRule),
            Box::new(MapAreaRule),
            Box::new(LowConfidenceRule),
        ];

        Self { rules }
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }

    /// Run every rule, escalate the running level monotonically, dedupe,
    /// sort, and render. No firing rule yields the nominal result.
    pub fn evaluate(&self, ctx: &RuleContext) -> AlertResult {
        let mut level = AlertLevel::Info;
        let mut candidates: Vec<AlertCandidate> = Vec::new();

        for rule in &self.rules {
            for candidate in rule.evaluate(ctx) {
                level.escalate(candidate.level);
                candidates.push(candidate);
            }
        }

        if candidates.is_empty() {
            return AlertResult::nominal();
        }

        let deduped = dedupe(candidates);
        let message = render(level, &deduped);

        AlertResult {
            level,
            message,
            candidates: deduped,
        }
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse duplicate (source, category) pairs, keeping the most severe
/// candidate (first seen wins ties), then order by severity descending with
/// detection order as the tiebreak.
fn dedupe(candidates: Vec<AlertCandidate>) -> Vec<AlertCandidate> {
    let mut kept: Vec<(usize, AlertCandidate)> = Vec::new();

    for (index, candidate) in candidates.into_iter().enumerate() {
        let existing = kept
            .iter()
            .position(|(_, k)| k.source == candidate.source && k.category == candidate.category);
        match existing {
            Some(i) => {
                if candidate.level > kept[i].1.level {
                    kept[i].1 = candidate;
                }
            }
            None => kept.push((index, candidate)),
        }
    }

    kept.sort_by(|(ia, a), (ib, b)| b.level.cmp(&a.level).then(ia.cmp(ib)));
    kept.into_iter().map(|(_, c)| c).collect()
}

/// Render `"<LEVEL>: part1. part2. ..."`, hard-capped at the character
/// budget with a trailing truncation marker.
fn render(level: AlertLevel, candidates: &[AlertCandidate]) -> String {
    let body = candidates
        .iter()
        .map(|c| c.message.as_str())
        .collect::<Vec<_>>()
        .join(". ");
    let message = format!("{}: {}", level.as_str(), body);

    if message.chars().count() <= ALERT_CHAR_BUDGET {
        return message;
    }

    let keep = ALERT_CHAR_BUDGET - TRUNCATION_MARKER.chars().count();
    let truncated: String = message.chars().take(keep).collect();
    format!("{}{}", truncated, TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertSource, ImageryResult, MapSummary, SensorReading, StressResult};
    use chrono::Utc;

    fn quiet_map() -> MapSummary {
        MapSummary {
            mean_health: 0.75,
            health_std_dev: 0.05,
            min_health: 0.5,
            max_health: 0.95,
            healthy_percent: 72.0,
            critical_percent: 1.0,
            stressed_percent: 28.0,
            waterlogged_percent: 0.0,
        }
    }

    fn healthy_reading() -> SensorReading {
        let mut r = SensorReading::new("t", Utc::now());
        r.temperature_c = Some(22.0);
        r.humidity_percent = Some(60.0);
        r.soil_moisture_percent = Some(50.0);
        r.ph = Some(6.5);
        r.battery_percent = Some(95.0);
        r.data_quality = 1.0;
        r
    }

    #[test]
    fn quiet_inputs_yield_nominal_message() {
        let map = quiet_map();
        let reading = healthy_reading();
        let ctx = RuleContext {
            reading: Some(&reading),
            imagery: None,
            stress: None,
            fused_score: 0.75,
            map: &map,
            overall_confidence: 0.9,
        };
        let result = AlertEngine::new().evaluate(&ctx);
        assert_eq!(result.level, AlertLevel::Info);
        assert!(!result.message.is_empty());
        assert!(result.message.starts_with("Nominal"));
    }

    #[test]
    fn level_is_the_maximum_of_all_candidates() {
        let map = quiet_map();
        let mut reading = healthy_reading();
        reading.temperature_c = Some(38.0); // Critical
        let stress = StressResult {
            stress_level: 0.8, // Warning, evaluated after the critical rule
            yield_impact: 0.1,
            confidence: None,
            problem_zones: vec![],
        };
        let ctx = RuleContext {
            reading: Some(&reading),
            imagery: None,
            stress: Some(&stress),
            fused_score: 0.5,
            map: &map,
            overall_confidence: 0.9,
        };
        let result = AlertEngine::new().evaluate(&ctx);
        assert_eq!(result.level, AlertLevel::Critical);
        assert!(result.message.starts_with("Critical: "));
    }

    #[test]
    fn message_is_bounded_with_marker() {
        let map = MapSummary {
            mean_health: 0.2,
            health_std_dev: 0.1,
            min_health: 0.0,
            max_health: 0.5,
            healthy_percent: 5.0,
            critical_percent: 60.0,
            stressed_percent: 55.0,
            waterlogged_percent: 40.0,
        };
        let mut reading = healthy_reading();
        reading.temperature_c = Some(41.0);
        reading.soil_moisture_percent = Some(12.0);
        reading.ph = Some(4.0);
        reading.humidity_percent = Some(96.0);
        reading.battery_percent = Some(7.0);
        let imagery = ImageryResult {
            health_score: 0.15,
            disease_detected: true,
            disease_confidence: 0.95,
            vegetation_index: 0.1,
            anomaly_count: 12,
            confidence: Some(0.4),
        };
        let stress = StressResult {
            stress_level: 0.9,
            yield_impact: 0.6,
            confidence: Some(0.3),
            problem_zones: vec![],
        };
        let ctx = RuleContext {
            reading: Some(&reading),
            imagery: Some(&imagery),
            stress: Some(&stress),
            fused_score: 0.2,
            map: &map,
            overall_confidence: 0.3,
        };
        let result = AlertEngine::new().evaluate(&ctx);
        assert!(result.message.chars().count() <= ALERT_CHAR_BUDGET);
        assert!(result.message.ends_with(TRUNCATION_MARKER));
        assert!(result.message.starts_with("Critical: "));
    }

    #[test]
    fn candidates_are_sorted_most_severe_first() {
        let map = quiet_map();
        let mut reading = healthy_reading();
        reading.temperature_c = Some(38.0); // Critical
        reading.battery_percent = Some(18.0); // Warning
        let ctx = RuleContext {
            reading: Some(&reading),
            imagery: None,
            stress: None,
            fused_score: 0.6,
            map: &map,
            overall_confidence: 0.4, // Caution
        };
        let result = AlertEngine::new().evaluate(&ctx);
        let levels: Vec<AlertLevel> = result.candidates.iter().map(|c| c.level).collect();
        let mut sorted = levels.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(levels, sorted);
        assert_eq!(result.candidates[0].level, AlertLevel::Critical);
    }

    #[test]
    fn dedupe_keeps_most_severe_per_key() {
        let candidates = vec![
            AlertCandidate::new(AlertSource::Sensor, "temperature", AlertLevel::Warning, "warm"),
            AlertCandidate::new(AlertSource::Sensor, "temperature", AlertLevel::Critical, "hot"),
            AlertCandidate::new(AlertSource::Map, "healthy_area", AlertLevel::Warning, "thin"),
        ];
        let deduped = dedupe(candidates);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].message, "hot");
        assert_eq!(deduped[0].level, AlertLevel::Critical);
    }
}
