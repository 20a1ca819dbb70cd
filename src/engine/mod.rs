pub mod controller;
pub mod fusion;
pub mod map;
pub mod rules;
pub mod trends;
pub mod weights;

pub use controller::{AnalysisEngine, AnalysisOutput};
pub use weights::FusionWeights;

use crate::models::ImageryRequest;
use std::time::Duration;

/// Engine-side tunables. Everything here is deterministic configuration;
/// the engine holds no other state between invocations.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Readings older than this make the sensor source unavailable.
    pub sensor_max_age: Duration,
    /// Per-source fetch deadline; a source that misses it is unavailable.
    pub source_timeout: Duration,
    /// Seed for the map synthesizer's deterministic spatial variation.
    pub map_seed: u64,
    /// Problem zones synthesized when the stress model supplies none.
    pub synthetic_zone_count: usize,
    /// What to ask the imagery classifier for.
    pub imagery_request: ImageryRequest,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensor_max_age: Duration::from_secs(60 * 60),
            source_timeout: Duration::from_secs(10),
            map_seed: 0x43_52_4f_50, // arbitrary fixed default
            synthetic_zone_count: 3,
            imagery_request: ImageryRequest::default(),
        }
    }
}
