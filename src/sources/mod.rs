pub mod imagery;
pub mod sensor;
pub mod stress;
pub mod stub;

pub use imagery::ImageryServiceClient;
pub use sensor::SqliteSensorGateway;
pub use stress::StressServiceClient;

use crate::models::{ImageryRequest, ImageryResult, SensorReading, SourceFetch, StressResult};
use async_trait::async_trait;
use std::time::Duration;

/// Gateway to the in-field sensor feed.
///
/// Adapters never return errors: any failure mode maps to a
/// `SourceFetch` status, and `Unavailable` is an expected outcome.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Fetch the freshest reading; `Unavailable` when nothing is newer
    /// than `max_age`.
    async fn fetch(&self, max_age: Duration) -> SourceFetch<SensorReading>;
}

/// Gateway to the remote-imagery health classifier.
#[async_trait]
pub trait ImagerySource: Send + Sync {
    async fn fetch(&self, request: &ImageryRequest) -> SourceFetch<ImageryResult>;
}

/// Gateway to the stress-prediction model. Receives the caller-owned rolling
/// history so the model can condition on recent conditions.
#[async_trait]
pub trait StressSource: Send + Sync {
    async fn fetch(&self, history: &[SensorReading]) -> SourceFetch<StressResult>;
}

// Boxed sources forward to the inner adapter, so callers can mix adapter
// types chosen at runtime (configured service vs. built-in stub).

#[async_trait]
impl SensorSource for Box<dyn SensorSource> {
    async fn fetch(&self, max_age: Duration) -> SourceFetch<SensorReading> {
        (**self).fetch(max_age).await
    }
}

#[async_trait]
impl ImagerySource for Box<dyn ImagerySource> {
    async fn fetch(&self, request: &ImageryRequest) -> SourceFetch<ImageryResult> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl StressSource for Box<dyn StressSource> {
    async fn fetch(&self, history: &[SensorReading]) -> SourceFetch<StressResult> {
        (**self).fetch(history).await
    }
}
