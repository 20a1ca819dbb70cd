use super::fusion::{self, SourceHealths};
use super::map::MapSynthesizer;
use super::rules::{AlertEngine, RuleContext};
use super::trends;
use super::weights::FusionWeights;
use super::EngineConfig;
use crate::error::Result;
use crate::models::{
    AlertLevel, AnalysisStats, DegradationTier, HealthMap, ImageryResult, SensorReading,
    SourceFetch, SourceStatus, StressResult, WATERLOGGING_MOISTURE_PERCENT,
};
use crate::sources::{ImagerySource, SensorSource, StressSource};
use tokio::time::timeout;

/// Fixed alert text for the emergency tier. Deterministic and well under the
/// character budget.
pub const EMERGENCY_ALERT: &str =
    "Warning: fallback mode active. No usable data sources; placeholder assessment shown.";

/// The three outputs of one analysis invocation.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub health_map: HealthMap,
    pub alert_message: String,
    pub stats: AnalysisStats,
}

/// Root orchestrator: fetches the three sources concurrently, selects the
/// fallback tier once, runs the fusion pipeline, and guarantees a valid,
/// finite output on every path.
pub struct AnalysisEngine<S, I, T> {
    sensor: S,
    imagery: I,
    stress: T,
    config: EngineConfig,
    alert_engine: AlertEngine,
}

impl<S, I, T> AnalysisEngine<S, I, T>
where
    S: SensorSource,
    I: ImagerySource,
    T: StressSource,
{
    pub fn new(sensor: S, imagery: I, stress: T, config: EngineConfig) -> Self {
        Self {
            sensor,
            imagery,
            stress,
            config,
            alert_engine: AlertEngine::new(),
        }
    }

    /// The only public entry point. Always returns; never panics; every
    /// numeric field in the output is finite. `history` is the caller-owned
    /// rolling buffer used for trends and offered to the stress model.
    pub async fn run_analysis(&self, history: &[SensorReading]) -> AnalysisOutput {
        let (sensor_fetch, imagery_fetch, stress_fetch) = self.fetch_all(history).await;

        if let Some(detail) = sensor_fetch.detail() {
            tracing::warn!(source = "sensor", "{}", detail);
        }
        if let Some(detail) = imagery_fetch.detail() {
            tracing::warn!(source = "imagery", "{}", detail);
        }
        if let Some(detail) = stress_fetch.detail() {
            tracing::warn!(source = "stress", "{}", detail);
        }

        let tier = select_tier(
            sensor_fetch.status(),
            imagery_fetch.status(),
            stress_fetch.status(),
        );
        tracing::info!(
            tier = %tier,
            sensor = %sensor_fetch.status(),
            imagery = %imagery_fetch.status(),
            stress = %stress_fetch.status(),
            "Selected degradation tier"
        );

        if tier == DegradationTier::Emergency {
            return self.emergency_output();
        }

        match self.analyze(tier, &sensor_fetch, &imagery_fetch, &stress_fetch, history) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Analysis pipeline failed, entering fallback mode: {}", e);
                self.emergency_output()
            }
        }
    }

    /// Fetch the three sources concurrently, each under the configured
    /// deadline. A source that misses the deadline is unavailable, never
    /// awaited further.
    async fn fetch_all(
        &self,
        history: &[SensorReading],
    ) -> (
        SourceFetch<SensorReading>,
        SourceFetch<ImageryResult>,
        SourceFetch<StressResult>,
    ) {
        let deadline = self.config.source_timeout;
        let (sensor, imagery, stress) = tokio::join!(
            timeout(deadline, self.sensor.fetch(self.config.sensor_max_age)),
            timeout(deadline, self.imagery.fetch(&self.config.imagery_request)),
            timeout(deadline, self.stress.fetch(history)),
        );

        (
            sensor.unwrap_or_else(|_| SourceFetch::unavailable("sensor fetch timed out")),
            imagery.unwrap_or_else(|_| SourceFetch::unavailable("imagery fetch timed out")),
            stress.unwrap_or_else(|_| SourceFetch::unavailable("stress fetch timed out")),
        )
    }

    fn analyze(
        &self,
        tier: DegradationTier,
        sensor_fetch: &SourceFetch<SensorReading>,
        imagery_fetch: &SourceFetch<ImageryResult>,
        stress_fetch: &SourceFetch<StressResult>,
        history: &[SensorReading],
    ) -> Result<AnalysisOutput> {
        let reading = sensor_fetch.value();
        let imagery = imagery_fetch.value();
        let stress = stress_fetch.value();

        let weights = FusionWeights::derive(
            sensor_fetch.status(),
            imagery_fetch.status(),
            stress_fetch.status(),
        )?;
        let confidence = weights.confidence(
            reading.map(|r| r.data_quality),
            imagery.and_then(|i| i.confidence),
            stress.and_then(|s| s.confidence),
        );

        let healths = SourceHealths {
            sensor: reading.map(fusion::sensor_health),
            imagery: imagery.map(|i| i.health_score),
            stress: stress.map(|s| 1.0 - s.stress_level),
        };
        let fused = fusion::fuse(&weights, &healths)?;

        let zones = stress.map(|s| s.problem_zones.as_slice()).unwrap_or(&[]);
        let synthesizer =
            MapSynthesizer::new(self.config.map_seed, self.config.synthetic_zone_count);
        let health_map = synthesizer.synthesize(fused, zones);

        let high_moisture = reading
            .and_then(|r| r.soil_moisture_percent)
            .map(|m| m > WATERLOGGING_MOISTURE_PERCENT)
            .unwrap_or(false);
        let map_summary = health_map.summarize(high_moisture);

        let ctx = RuleContext {
            reading,
            imagery,
            stress,
            fused_score: fused,
            map: &map_summary,
            overall_confidence: confidence,
        };
        let alert = self.alert_engine.evaluate(&ctx);
        if let Some(top) = alert.candidates.first() {
            tracing::debug!(
                count = alert.candidates.len(),
                top_source = top.source.as_str(),
                "Alert candidates collected"
            );
        }

        let trend_summary = trends::summarize_trends(reading, history);

        let mut stats = AnalysisStats::empty(
            tier,
            data_source_label(
                sensor_fetch.status(),
                imagery_fetch.status(),
                stress_fetch.status(),
            ),
        );

        if let Some(r) = reading {
            stats.temperature_c = r.temperature_c.unwrap_or(0.0);
            stats.humidity_percent = r.humidity_percent.unwrap_or(0.0);
            stats.soil_moisture_percent = r.soil_moisture_percent.unwrap_or(0.0);
            stats.ph = r.ph.unwrap_or(0.0);
            stats.light_intensity_lux = r.light_intensity_lux.unwrap_or(0.0);
            stats.data_quality = r.data_quality;
        }

        stats.predicted_temperature_c = trend_summary.predicted_temperature_c;
        stats.predicted_humidity_percent = trend_summary.predicted_humidity_percent;
        stats.predicted_soil_moisture_percent = trend_summary.predicted_soil_moisture_percent;
        stats.temperature_trend = trend_summary.temperature_trend;
        stats.humidity_trend = trend_summary.humidity_trend;
        stats.moisture_trend = trend_summary.moisture_trend;

        stats.fused_health_score = fused;
        stats.apply_map_summary(&map_summary);

        if let Some(i) = imagery {
            stats.ndvi_mean = i.vegetation_index;
            stats.disease_detected = i.disease_detected;
            stats.anomaly_count = i.anomaly_count;
        }
        if let Some(s) = stress {
            stats.plant_stress_level = s.stress_level;
            stats.yield_impact_percent = s.yield_impact * 100.0;
        }

        stats.sensor_weight = weights.sensor;
        stats.imagery_weight = weights.imagery;
        stats.stress_weight = weights.stress;
        stats.overall_confidence = confidence;
        stats.alert_level = alert.level;

        Ok(AnalysisOutput {
            health_map,
            alert_message: alert.message,
            stats: stats.sanitized(),
        })
    }

    /// The guaranteed-success path: a deterministic, clearly-labeled
    /// placeholder. Nothing here can fail.
    fn emergency_output(&self) -> AnalysisOutput {
        let health_map = HealthMap::uniform(0.5);
        let map_summary = health_map.summarize(false);

        let mut stats = AnalysisStats::empty(DegradationTier::Emergency, "fallback");
        stats.fused_health_score = 0.5;
        stats.apply_map_summary(&map_summary);
        stats.alert_level = AlertLevel::Warning;

        AnalysisOutput {
            health_map,
            alert_message: EMERGENCY_ALERT.to_string(),
            stats: stats.sanitized(),
        }
    }
}

/// One-shot tier selection from the three fetch statuses. Degraded counts
/// as available; the weighting layer handles the trust discount.
pub fn select_tier(
    sensor: SourceStatus,
    imagery: SourceStatus,
    stress: SourceStatus,
) -> DegradationTier {
    let available = [sensor, imagery, stress]
        .iter()
        .filter(|s| s.is_available())
        .count();

    match available {
        3 => DegradationTier::Full,
        2 => DegradationTier::Partial,
        1 => DegradationTier::SingleSource,
        _ => DegradationTier::Emergency,
    }
}

fn data_source_label(
    sensor: SourceStatus,
    imagery: SourceStatus,
    stress: SourceStatus,
) -> String {
    let names: Vec<&str> = [
        (sensor, "sensor"),
        (imagery, "imagery"),
        (stress, "stress"),
    ]
    .iter()
    .filter(|(status, _)| status.is_available())
    .map(|(_, name)| *name)
    .collect();

    if names.is_empty() {
        "fallback".to_string()
    } else {
        names.join("+")
    }
}
