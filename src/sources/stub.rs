//! Deterministic in-memory sources for demo mode and tests.
//!
//! The engine is a pure function of its source outputs, so these doubles
//! make whole-pipeline behavior reproducible byte-for-byte.

use super::{ImagerySource, SensorSource, StressSource};
use crate::models::{
    ImageryRequest, ImageryResult, ProblemZone, SensorReading, SourceFetch, StressResult,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::time::Duration as StdDuration;

pub struct StaticSensorSource {
    fetch: SourceFetch<SensorReading>,
}

impl StaticSensorSource {
    pub fn new(fetch: SourceFetch<SensorReading>) -> Self {
        Self { fetch }
    }

    pub fn unavailable() -> Self {
        Self::new(SourceFetch::unavailable("stub: no sensor data"))
    }
}

#[async_trait]
impl SensorSource for StaticSensorSource {
    async fn fetch(&self, _max_age: StdDuration) -> SourceFetch<SensorReading> {
        self.fetch.clone()
    }
}

pub struct StaticImagerySource {
    fetch: SourceFetch<ImageryResult>,
}

impl StaticImagerySource {
    pub fn new(fetch: SourceFetch<ImageryResult>) -> Self {
        Self { fetch }
    }

    pub fn unavailable() -> Self {
        Self::new(SourceFetch::unavailable("stub: no imagery"))
    }
}

#[async_trait]
impl ImagerySource for StaticImagerySource {
    async fn fetch(&self, _request: &ImageryRequest) -> SourceFetch<ImageryResult> {
        self.fetch.clone()
    }
}

pub struct StaticStressSource {
    fetch: SourceFetch<StressResult>,
}

impl StaticStressSource {
    pub fn new(fetch: SourceFetch<StressResult>) -> Self {
        Self { fetch }
    }

    pub fn unavailable() -> Self {
        Self::new(SourceFetch::unavailable("stub: no stress prediction"))
    }
}

#[async_trait]
impl StressSource for StaticStressSource {
    async fn fetch(&self, _history: &[SensorReading]) -> SourceFetch<StressResult> {
        self.fetch.clone()
    }
}

/// A healthy mid-season reading for demo runs.
pub fn demo_reading() -> SensorReading {
    SensorReading::validated(
        "demo-field-01",
        Utc::now(),
        Some(23.5),
        Some(62.0),
        Some(48.0),
        Some(6.6),
        Some(820.0),
        Some(91.0),
        Some(-58.0),
    )
    .with_location(39.86, -75.79)
}

/// A short rolling history with a gentle warming trend.
pub fn demo_history() -> Vec<SensorReading> {
    let now = Utc::now();
    (0..6)
        .map(|i| {
            SensorReading::validated(
                "demo-field-01",
                now - Duration::hours(i),
                Some(23.5 - 0.4 * i as f64),
                Some(62.0 + 0.5 * i as f64),
                Some(48.0 + 0.3 * i as f64),
                Some(6.6),
                Some(820.0),
                Some(91.0),
                Some(-58.0),
            )
        })
        .collect()
}

pub fn demo_imagery() -> ImageryResult {
    ImageryResult {
        health_score: 0.78,
        disease_detected: false,
        disease_confidence: 0.12,
        vegetation_index: 0.64,
        anomaly_count: 1,
        confidence: Some(0.9),
    }
}

pub fn demo_stress() -> StressResult {
    StressResult {
        stress_level: 0.28,
        yield_impact: 0.08,
        confidence: Some(0.82),
        problem_zones: vec![ProblemZone {
            center_x: 0.68,
            center_y: 0.31,
            radius: 0.12,
            intensity: 0.35,
            label: Some("southeast dry patch".into()),
        }],
    }
}
