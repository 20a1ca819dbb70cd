use crate::error::{CropSightError, Result};
use crate::models::SourceStatus;
use serde::{Deserialize, Serialize};

/// Base contribution weights in the full tier.
pub const BASE_SENSOR_WEIGHT: f64 = 0.3;
pub const BASE_IMAGERY_WEIGHT: f64 = 0.4;
pub const BASE_STRESS_WEIGHT: f64 = 0.3;

/// Degraded sources keep half of their base weight.
const DEGRADED_FACTOR: f64 = 0.5;

/// Quality assumed for a model source that reports no confidence of its own.
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.8;

/// Normalized per-source contribution weights.
///
/// Invariant: non-negative and summing to 1. Derived fresh per invocation,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    pub sensor: f64,
    pub imagery: f64,
    pub stress: f64,
}

impl FusionWeights {
    /// Derive weights from the three fetch statuses: unavailable sources are
    /// zeroed, degraded sources halved, and the remainder renormalized.
    ///
    /// Fails when no source is available; the caller must select the
    /// emergency tier instead of dividing by zero.
    pub fn derive(
        sensor: SourceStatus,
        imagery: SourceStatus,
        stress: SourceStatus,
    ) -> Result<Self> {
        let raw_sensor = status_factor(sensor) * BASE_SENSOR_WEIGHT;
        let raw_imagery = status_factor(imagery) * BASE_IMAGERY_WEIGHT;
        let raw_stress = status_factor(stress) * BASE_STRESS_WEIGHT;

        let total = raw_sensor + raw_imagery + raw_stress;
        if total <= 0.0 {
            return Err(CropSightError::Fusion(
                "no data source available for weighting".into(),
            ));
        }

        Ok(Self {
            sensor: raw_sensor / total,
            imagery: raw_imagery / total,
            stress: raw_stress / total,
        })
    }

    pub fn sum(&self) -> f64 {
        self.sensor + self.imagery + self.stress
    }

    /// Weighted mean of the quality scores of the sources actually used.
    /// Zero-weight sources contribute nothing and do not drag the mean down.
    pub fn confidence(
        &self,
        sensor_quality: Option<f64>,
        imagery_quality: Option<f64>,
        stress_quality: Option<f64>,
    ) -> f64 {
        let quality = |q: Option<f64>| {
            q.unwrap_or(DEFAULT_MODEL_CONFIDENCE)
                .clamp(0.0, 1.0)
        };
        let mut confidence = 0.0;
        if self.sensor > 0.0 {
            confidence += self.sensor * quality(sensor_quality);
        }
        if self.imagery > 0.0 {
            confidence += self.imagery * quality(imagery_quality);
        }
        if self.stress > 0.0 {
            confidence += self.stress * quality(stress_quality);
        }
        confidence.clamp(0.0, 1.0)
    }
}

fn status_factor(status: SourceStatus) -> f64 {
    match status {
        SourceStatus::Success => 1.0,
        SourceStatus::Degraded => DEGRADED_FACTOR,
        SourceStatus::Unavailable => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SourceStatus::*;

    fn assert_normalized(weights: &FusionWeights) {
        assert!(weights.sensor >= 0.0 && weights.imagery >= 0.0 && weights.stress >= 0.0);
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn full_tier_uses_base_proportions() {
        let weights = FusionWeights::derive(Success, Success, Success).unwrap();
        assert_normalized(&weights);
        assert!((weights.sensor - 0.3).abs() < 1e-9);
        assert!((weights.imagery - 0.4).abs() < 1e-9);
        assert!((weights.stress - 0.3).abs() < 1e-9);
    }

    #[test]
    fn unavailable_source_is_zeroed_and_renormalized() {
        let weights = FusionWeights::derive(Success, Unavailable, Success).unwrap();
        assert_normalized(&weights);
        assert_eq!(weights.imagery, 0.0);
        assert!((weights.sensor - 0.5).abs() < 1e-9);
        assert!((weights.stress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn degraded_source_keeps_half_weight() {
        let weights = FusionWeights::derive(Success, Degraded, Success).unwrap();
        assert_normalized(&weights);
        // 0.3 : 0.2 : 0.3 renormalized
        assert!((weights.imagery - 0.2 / 0.8).abs() < 1e-9);
    }

    #[test]
    fn every_status_combination_normalizes() {
        let statuses = [Success, Degraded, Unavailable];
        for s in statuses {
            for i in statuses {
                for t in statuses {
                    match FusionWeights::derive(s, i, t) {
                        Ok(weights) => assert_normalized(&weights),
                        Err(_) => {
                            assert!(!s.is_available() && !i.is_available() && !t.is_available())
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn all_unavailable_fails_explicitly() {
        assert!(FusionWeights::derive(Unavailable, Unavailable, Unavailable).is_err());
    }

    #[test]
    fn confidence_ignores_zero_weight_sources() {
        let weights = FusionWeights::derive(Success, Unavailable, Unavailable).unwrap();
        let confidence = weights.confidence(Some(0.9), None, None);
        assert!((confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn confidence_is_quality_weighted() {
        let weights = FusionWeights::derive(Success, Success, Success).unwrap();
        let confidence = weights.confidence(Some(1.0), Some(0.5), Some(0.0));
        assert!((confidence - (0.3 * 1.0 + 0.4 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn missing_model_quality_uses_default() {
        let weights = FusionWeights::derive(Unavailable, Success, Unavailable).unwrap();
        let confidence = weights.confidence(None, None, None);
        assert!((confidence - DEFAULT_MODEL_CONFIDENCE).abs() < 1e-9);
    }
}
