use super::StressSource;
use crate::config::StressServiceConfig;
use crate::models::{ProblemZone, SensorReading, SourceFetch, StressResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// HTTP client for the stress-prediction model service.
pub struct StressServiceClient {
    client: reqwest::Client,
    config: StressServiceConfig,
}

// Prediction API wire structures
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    readings: &'a [SensorReading],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    stress_level: f64,
    #[serde(default)]
    yield_impact: f64,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    zones: Vec<WireZone>,
    #[serde(default)]
    degraded: bool,
}

#[derive(Debug, Deserialize)]
struct WireZone {
    x: f64,
    y: f64,
    radius: f64,
    intensity: f64,
    #[serde(default)]
    label: Option<String>,
}

impl StressServiceClient {
    pub fn new(config: StressServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/health", self.config.url.trim_end_matches('/'));
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn convert_response(&self, response: PredictResponse) -> (StressResult, bool) {
        let result = StressResult {
            stress_level: response.stress_level,
            yield_impact: response.yield_impact,
            confidence: response.confidence,
            problem_zones: response
                .zones
                .into_iter()
                .map(|z| ProblemZone {
                    center_x: z.x,
                    center_y: z.y,
                    radius: z.radius,
                    intensity: z.intensity,
                    label: z.label,
                })
                .collect(),
        }
        .normalized();
        (result, response.degraded)
    }
}

#[async_trait]
impl StressSource for StressServiceClient {
    async fn fetch(&self, history: &[SensorReading]) -> SourceFetch<StressResult> {
        let url = format!("{}/predict", self.config.url.trim_end_matches('/'));

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&PredictRequest { readings: history })
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return SourceFetch::unavailable(format!("stress service: {}", e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            return SourceFetch::unavailable(format!("stress service returned {}", status));
        }

        let parsed: PredictResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                return SourceFetch::unavailable(format!("stress response parse: {}", e));
            }
        };

        let (result, degraded) = self.convert_response(parsed);
        if degraded {
            SourceFetch::degraded(result, "model ran with a reduced feature set")
        } else {
            SourceFetch::success(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> StressServiceConfig {
        StressServiceConfig {
            url: "http://localhost:9091".to_string(),
            api_key: "test_key".to_string(),
            enabled: true,
        }
    }

    #[test]
    fn zones_are_converted_and_validated() {
        let client = StressServiceClient::new(sample_config());
        let (result, _) = client.convert_response(PredictResponse {
            stress_level: 0.6,
            yield_impact: 0.2,
            confidence: Some(0.85),
            zones: vec![
                WireZone {
                    x: 0.25,
                    y: 0.75,
                    radius: 0.1,
                    intensity: 0.4,
                    label: Some("north dry patch".into()),
                },
                WireZone {
                    x: 5.0, // off-field
                    y: 0.5,
                    radius: 0.1,
                    intensity: 0.4,
                    label: None,
                },
            ],
            degraded: false,
        });
        assert_eq!(result.problem_zones.len(), 1);
        assert_eq!(result.stress_level, 0.6);
    }
}
