use super::weights::FusionWeights;
use crate::error::{CropSightError, Result};
use crate::models::SensorReading;

/// Agronomic optimum band for one sensor parameter.
///
/// The health contribution decays with a Gaussian falloff as the value moves
/// away from `center`; at the band edge the score is `exp(-1)` ≈ 0.37.
#[derive(Debug, Clone, Copy)]
pub struct OptimalBand {
    pub center: f64,
    pub width: f64,
}

pub const TEMPERATURE_OPTIMUM: OptimalBand = OptimalBand {
    center: 22.5,
    width: 15.0, // 15–30 °C
};
pub const HUMIDITY_OPTIMUM: OptimalBand = OptimalBand {
    center: 60.0,
    width: 40.0, // 40–80 %
};
pub const SOIL_MOISTURE_OPTIMUM: OptimalBand = OptimalBand {
    center: 50.0,
    width: 40.0, // 30–70 %
};
pub const PH_OPTIMUM: OptimalBand = OptimalBand {
    center: 6.5,
    width: 2.0, // 5.5–7.5
};
pub const LIGHT_OPTIMUM: OptimalBand = OptimalBand {
    center: 800.0,
    width: 800.0, // 400–1200 lux
};

/// Score a missing or invalid parameter contributes: neutral rather than
/// dropped, which keeps the mean well-defined across sparse readings.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Gaussian closeness-to-optimum score in [0, 1].
pub fn parameter_score(value: Option<f64>, band: &OptimalBand) -> f64 {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return NEUTRAL_SCORE;
    };
    let normalized = (value - band.center) / (band.width / 2.0);
    (-(normalized * normalized)).exp().clamp(0.0, 1.0)
}

/// Scalar sensor health: mean of the per-parameter scores.
pub fn sensor_health(reading: &SensorReading) -> f64 {
    let scores = [
        parameter_score(reading.temperature_c, &TEMPERATURE_OPTIMUM),
        parameter_score(reading.humidity_percent, &HUMIDITY_OPTIMUM),
        parameter_score(reading.soil_moisture_percent, &SOIL_MOISTURE_OPTIMUM),
        parameter_score(reading.ph, &PH_OPTIMUM),
        parameter_score(reading.light_intensity_lux, &LIGHT_OPTIMUM),
    ];
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Per-source scalar health estimates feeding the weighted sum.
///
/// `imagery` is the classifier's health score; `stress` is the inverted
/// stress level. Either falls back to the sensor estimate when its source
/// did not contribute, and anything still missing falls back to neutral.
#[derive(Debug, Clone, Copy)]
pub struct SourceHealths {
    pub sensor: Option<f64>,
    pub imagery: Option<f64>,
    pub stress: Option<f64>,
}

impl SourceHealths {
    fn resolve(&self, preferred: Option<f64>) -> f64 {
        preferred
            .or(self.sensor)
            .unwrap_or(NEUTRAL_SCORE)
            .clamp(0.0, 1.0)
    }
}

/// Confidence-weighted fusion of the per-source health estimates.
///
/// Returns an error if the result is non-finite; the degradation controller
/// converts that into the emergency tier.
pub fn fuse(weights: &FusionWeights, healths: &SourceHealths) -> Result<f64> {
    let fused = weights.sensor * healths.resolve(healths.sensor)
        + weights.imagery * healths.resolve(healths.imagery)
        + weights.stress * healths.resolve(healths.stress);

    if !fused.is_finite() {
        return Err(CropSightError::Fusion(format!(
            "fused health score is not finite ({})",
            fused
        )));
    }

    Ok(fused.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceStatus;
    use chrono::Utc;

    fn reading(
        temp: Option<f64>,
        humidity: Option<f64>,
        moisture: Option<f64>,
        ph: Option<f64>,
        light: Option<f64>,
    ) -> SensorReading {
        let mut r = SensorReading::new("t", Utc::now());
        r.temperature_c = temp;
        r.humidity_percent = humidity;
        r.soil_moisture_percent = moisture;
        r.ph = ph;
        r.light_intensity_lux = light;
        r
    }

    #[test]
    fn optimal_values_score_near_one() {
        assert!((parameter_score(Some(22.5), &TEMPERATURE_OPTIMUM) - 1.0).abs() < 1e-12);
        assert!((parameter_score(Some(6.5), &PH_OPTIMUM) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn band_edge_scores_exp_minus_one() {
        let score = parameter_score(Some(30.0), &TEMPERATURE_OPTIMUM);
        assert!((score - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn missing_parameter_is_neutral() {
        assert_eq!(parameter_score(None, &TEMPERATURE_OPTIMUM), NEUTRAL_SCORE);
        assert_eq!(
            parameter_score(Some(f64::NAN), &TEMPERATURE_OPTIMUM),
            NEUTRAL_SCORE
        );
    }

    #[test]
    fn perfect_reading_has_high_health() {
        let r = reading(Some(22.5), Some(60.0), Some(50.0), Some(6.5), Some(800.0));
        assert!(sensor_health(&r) > 0.99);
    }

    #[test]
    fn empty_reading_is_neutral() {
        let r = reading(None, None, None, None, None);
        assert!((sensor_health(&r) - NEUTRAL_SCORE).abs() < 1e-12);
    }

    #[test]
    fn extreme_reading_scores_low() {
        let r = reading(Some(55.0), Some(5.0), Some(2.0), Some(3.0), Some(50.0));
        assert!(sensor_health(&r) < 0.1);
    }

    #[test]
    fn fused_score_is_weighted_sum() {
        let weights =
            FusionWeights::derive(SourceStatus::Success, SourceStatus::Success, SourceStatus::Success)
                .unwrap();
        let fused = fuse(
            &weights,
            &SourceHealths {
                sensor: Some(1.0),
                imagery: Some(0.5),
                stress: Some(0.0),
            },
        )
        .unwrap();
        assert!((fused - (0.3 + 0.4 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn fused_score_stays_in_unit_interval() {
        let weights =
            FusionWeights::derive(SourceStatus::Success, SourceStatus::Unavailable, SourceStatus::Success)
                .unwrap();
        for sensor in [0.0, 0.25, 0.5, 1.0] {
            for stress in [0.0, 0.5, 1.0] {
                let fused = fuse(
                    &weights,
                    &SourceHealths {
                        sensor: Some(sensor),
                        imagery: None,
                        stress: Some(stress),
                    },
                )
                .unwrap();
                assert!((0.0..=1.0).contains(&fused));
                assert!(fused.is_finite());
            }
        }
    }

    #[test]
    fn missing_model_healths_fall_back_to_sensor() {
        let weights =
            FusionWeights::derive(SourceStatus::Success, SourceStatus::Success, SourceStatus::Success)
                .unwrap();
        let fused = fuse(
            &weights,
            &SourceHealths {
                sensor: Some(0.8),
                imagery: None,
                stress: None,
            },
        )
        .unwrap();
        assert!((fused - 0.8).abs() < 1e-9);
    }
}
