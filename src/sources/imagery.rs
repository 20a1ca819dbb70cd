use super::ImagerySource;
use crate::config::ImageryServiceConfig;
use crate::models::{ImageryRequest, ImageryResult, SourceFetch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// HTTP client for the remote-imagery health classifier.
pub struct ImageryServiceClient {
    client: reqwest::Client,
    config: ImageryServiceConfig,
}

// Classifier API wire structures
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    image_ref: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    synthetic_size: Option<[u32; 2]>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    health_score: f64,
    disease_detected: bool,
    #[serde(default)]
    disease_confidence: f64,
    #[serde(default)]
    ndvi: f64,
    #[serde(default)]
    anomaly_count: u32,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    degraded: bool,
}

impl ImageryServiceClient {
    pub fn new(config: ImageryServiceConfig) -> Self {
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

    fn convert_response(&self, response: ClassifyResponse) -> (ImageryResult, bool) {
        let result = ImageryResult {
            health_score: response.health_score,
            disease_detected: response.disease_detected,
            disease_confidence: response.disease_confidence,
            vegetation_index: response.ndvi,
            anomaly_count: response.anomaly_count,
            confidence: response.confidence,
        }
        .normalized();
        (result, response.degraded)
    }
}

#[async_trait]
impl ImagerySource for ImageryServiceClient {
    async fn fetch(&self, request: &ImageryRequest) -> SourceFetch<ImageryResult> {
        let url = format!("{}/classify", self.config.url.trim_end_matches('/'));
        let body = match request {
            ImageryRequest::Reference(image_ref) => ClassifyRequest {
                image_ref: Some(image_ref),
                synthetic_size: None,
            },
            ImageryRequest::Synthetic { width, height } => ClassifyRequest {
                image_ref: None,
                synthetic_size: Some([*width, *height]),
            },
        };

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return SourceFetch::unavailable(format!("imagery service: {}", e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            return SourceFetch::unavailable(format!("imagery service returned {}", status));
        }

        let parsed: ClassifyResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                return SourceFetch::unavailable(format!("imagery response parse: {}", e));
            }
        };

        let (result, degraded) = self.convert_response(parsed);
        if degraded {
            SourceFetch::degraded(result, "classifier reported reduced accuracy")
        } else {
            SourceFetch::success(result)
        }
    }
}
