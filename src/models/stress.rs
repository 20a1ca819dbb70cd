use serde::{Deserialize, Serialize};

/// A circular region of depressed health reported by the stress model.
///
/// Coordinates and radius are normalized to [0, 1] over the field extent so
/// the map synthesizer can scale them to any grid resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemZone {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    /// Depth of the health depression at the zone center, in [0, 1].
    pub intensity: f64,
    pub label: Option<String>,
}

impl ProblemZone {
    pub fn is_valid(&self) -> bool {
        [self.center_x, self.center_y, self.radius, self.intensity]
            .iter()
            .all(|v| v.is_finite())
            && (0.0..=1.0).contains(&self.center_x)
            && (0.0..=1.0).contains(&self.center_y)
            && self.radius > 0.0
            && self.radius <= 1.0
            && (0.0..=1.0).contains(&self.intensity)
    }
}

/// Output of the stress-prediction model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressResult {
    /// Predicted plant stress in [0, 1] (0 = none).
    pub stress_level: f64,
    /// Predicted yield impact in [0, 1].
    pub yield_impact: f64,
    /// Model-reported confidence, when provided.
    pub confidence: Option<f64>,
    pub problem_zones: Vec<ProblemZone>,
}

impl StressResult {
    /// Adapter-boundary normalization: clamp scalars, drop malformed zones.
    pub fn normalized(mut self) -> Self {
        self.stress_level = sanitize_unit(self.stress_level);
        self.yield_impact = sanitize_unit(self.yield_impact);
        self.confidence = self.confidence.map(sanitize_unit);
        self.problem_zones.retain(ProblemZone::is_valid);
        self
    }
}

fn sanitize_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
