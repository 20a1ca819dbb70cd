use super::alert::AlertLevel;
use super::health_map::MapSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which fallback configuration an invocation ran under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegradationTier {
    Full,
    Partial,
    SingleSource,
    Emergency,
}

impl DegradationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationTier::Full => "Full",
            DegradationTier::Partial => "Partial",
            DegradationTier::SingleSource => "SingleSource",
            DegradationTier::Emergency => "Emergency",
        }
    }
}

impl std::fmt::Display for DegradationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flattened per-invocation statistics record.
///
/// Missing readings surface as 0.0 rather than NaN so every numeric field is
/// finite; `data_quality` and the tier metadata tell the consumer how much
/// to trust them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStats {
    // Current readings
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub soil_moisture_percent: f64,
    pub ph: f64,
    pub light_intensity_lux: f64,
    pub data_quality: f64,

    // Next-step predictions and trend slopes (per hour)
    pub predicted_temperature_c: f64,
    pub predicted_humidity_percent: f64,
    pub predicted_soil_moisture_percent: f64,
    pub temperature_trend: f64,
    pub humidity_trend: f64,
    pub moisture_trend: f64,

    // Fused signal and map aggregates
    pub fused_health_score: f64,
    pub mean_health: f64,
    pub health_std_dev: f64,
    pub healthy_area_percent: f64,
    pub critical_area_percent: f64,
    pub stressed_area_percent: f64,
    pub waterlogged_area_percent: f64,

    // Model-derived signals
    pub ndvi_mean: f64,
    pub disease_detected: bool,
    pub anomaly_count: u32,
    pub plant_stress_level: f64,
    pub yield_impact_percent: f64,

    // Fusion provenance
    pub sensor_weight: f64,
    pub imagery_weight: f64,
    pub stress_weight: f64,
    pub overall_confidence: f64,

    // Outcome metadata
    pub alert_level: AlertLevel,
    pub data_source: String,
    pub tier: DegradationTier,
    pub analysis_timestamp: DateTime<Utc>,
    pub version: String,
}

impl AnalysisStats {
    pub fn empty(tier: DegradationTier, data_source: impl Into<String>) -> Self {
        Self {
            temperature_c: 0.0,
            humidity_percent: 0.0,
            soil_moisture_percent: 0.0,
            ph: 0.0,
            light_intensity_lux: 0.0,
            data_quality: 0.0,
            predicted_temperature_c: 0.0,
            predicted_humidity_percent: 0.0,
            predicted_soil_moisture_percent: 0.0,
            temperature_trend: 0.0,
            humidity_trend: 0.0,
            moisture_trend: 0.0,
            fused_health_score: 0.0,
            mean_health: 0.0,
            health_std_dev: 0.0,
            healthy_area_percent: 0.0,
            critical_area_percent: 0.0,
            stressed_area_percent: 0.0,
            waterlogged_area_percent: 0.0,
            ndvi_mean: 0.0,
            disease_detected: false,
            anomaly_count: 0,
            plant_stress_level: 0.0,
            yield_impact_percent: 0.0,
            sensor_weight: 0.0,
            imagery_weight: 0.0,
            stress_weight: 0.0,
            overall_confidence: 0.0,
            alert_level: AlertLevel::Info,
            data_source: data_source.into(),
            tier,
            analysis_timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn apply_map_summary(&mut self, summary: &MapSummary) {
        self.mean_health = summary.mean_health;
        self.health_std_dev = summary.health_std_dev;
        self.healthy_area_percent = summary.healthy_percent;
        self.critical_area_percent = summary.critical_percent;
        self.stressed_area_percent = summary.stressed_percent;
        self.waterlogged_area_percent = summary.waterlogged_percent;
    }

    /// Replace any non-finite numeric with 0.0. Backstop for the finiteness
    /// guarantee; upstream stages should already produce finite values.
    pub fn sanitized(mut self) -> Self {
        for value in [
            &mut self.temperature_c,
            &mut self.humidity_percent,
            &mut self.soil_moisture_percent,
            &mut self.ph,
            &mut self.light_intensity_lux,
            &mut self.data_quality,
            &mut self.predicted_temperature_c,
            &mut self.predicted_humidity_percent,
            &mut self.predicted_soil_moisture_percent,
            &mut self.temperature_trend,
            &mut self.humidity_trend,
            &mut self.moisture_trend,
            &mut self.fused_health_score,
            &mut self.mean_health,
            &mut self.health_std_dev,
            &mut self.healthy_area_percent,
            &mut self.critical_area_percent,
            &mut self.stressed_area_percent,
            &mut self.waterlogged_area_percent,
            &mut self.ndvi_mean,
            &mut self.plant_stress_level,
            &mut self.yield_impact_percent,
            &mut self.sensor_weight,
            &mut self.imagery_weight,
            &mut self.stress_weight,
            &mut self.overall_confidence,
        ] {
            if !value.is_finite() {
                *value = 0.0;
            }
        }
        self
    }

    pub fn numeric_fields(&self) -> Vec<f64> {
        vec![
            self.temperature_c,
            self.humidity_percent,
            self.soil_moisture_percent,
            self.ph,
            self.light_intensity_lux,
            self.data_quality,
            self.predicted_temperature_c,
            self.predicted_humidity_percent,
            self.predicted_soil_moisture_percent,
            self.temperature_trend,
            self.humidity_trend,
            self.moisture_trend,
            self.fused_health_score,
            self.mean_health,
            self.health_std_dev,
            self.healthy_area_percent,
            self.critical_area_percent,
            self.stressed_area_percent,
            self.waterlogged_area_percent,
            self.ndvi_mean,
            self.plant_stress_level,
            self.yield_impact_percent,
            self.sensor_weight,
            self.imagery_weight,
            self.stress_weight,
            self.overall_confidence,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_scrubs_non_finite() {
        let mut stats = AnalysisStats::empty(DegradationTier::Full, "sensor");
        stats.fused_health_score = f64::NAN;
        stats.temperature_trend = f64::NEG_INFINITY;
        let stats = stats.sanitized();
        assert_eq!(stats.fused_health_score, 0.0);
        assert_eq!(stats.temperature_trend, 0.0);
        assert!(stats.numeric_fields().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn empty_stats_are_finite_and_tagged() {
        let stats = AnalysisStats::empty(DegradationTier::Emergency, "fallback");
        assert!(stats.numeric_fields().iter().all(|v| v.is_finite()));
        assert_eq!(stats.tier, DegradationTier::Emergency);
        assert_eq!(stats.data_source, "fallback");
    }
}
