use serde::{Deserialize, Serialize};

/// What the imagery classifier should analyze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ImageryRequest {
    /// Reference to an already-captured image (URL, tile id, capture id).
    Reference(String),
    /// Ask the service for a synthetic assessment at the given resolution.
    Synthetic { width: u32, height: u32 },
}

impl Default for ImageryRequest {
    fn default() -> Self {
        ImageryRequest::Synthetic {
            width: 100,
            height: 100,
        }
    }
}

/// Output of the remote-imagery health classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageryResult {
    /// Overall vegetation health in [0, 1].
    pub health_score: f64,
    pub disease_detected: bool,
    /// Classifier confidence in the disease call, in [0, 1].
    pub disease_confidence: f64,
    /// NDVI-like index; plausibly [-1, 1], commonly observed [0, 1].
    pub vegetation_index: f64,
    pub anomaly_count: u32,
    /// Model-reported confidence in the whole result, when provided.
    pub confidence: Option<f64>,
}

impl ImageryResult {
    /// Clamp scores into their documented ranges. Adapter-boundary
    /// normalization; fusion logic assumes these invariants hold.
    pub fn normalized(mut self) -> Self {
        self.health_score = sanitize_unit(self.health_score);
        self.disease_confidence = sanitize_unit(self.disease_confidence);
        self.vegetation_index = if self.vegetation_index.is_finite() {
            self.vegetation_index.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.confidence = self.confidence.map(sanitize_unit);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_clamps_and_scrubs() {
        let result = ImageryResult {
            health_score: 1.4,
            disease_detected: true,
            disease_confidence: f64::NAN,
            vegetation_index: -3.0,
            anomaly_count: 2,
            confidence: Some(f64::INFINITY),
        }
        .normalized();

        assert_eq!(result.health_score, 1.0);
        assert_eq!(result.disease_confidence, 0.0);
        assert_eq!(result.vegetation_index, -1.0);
        assert_eq!(result.confidence, Some(0.0));
    }
}
