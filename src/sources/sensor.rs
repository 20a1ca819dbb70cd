use super::SensorSource;
use crate::db::Database;
use crate::models::{SensorReading, SourceFetch};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

/// Minimum data quality before a reading is reported as degraded.
pub const DEFAULT_MIN_QUALITY: f64 = 0.5;

/// Sensor gateway backed by the local SQLite ingestion cache.
///
/// The MQTT forwarder (external to this crate) keeps the cache current;
/// this adapter only decides freshness and quality. A reading older than
/// half of `max_age` still counts but is reported as degraded.
pub struct SqliteSensorGateway {
    db: Database,
    min_quality: f64,
}

impl SqliteSensorGateway {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            min_quality: DEFAULT_MIN_QUALITY,
        }
    }

    pub fn with_min_quality(mut self, min_quality: f64) -> Self {
        self.min_quality = min_quality.clamp(0.0, 1.0);
        self
    }

    pub fn test_connection(&self) -> bool {
        self.db.latest_sensor_reading().is_ok()
    }
}

#[async_trait]
impl SensorSource for SqliteSensorGateway {
    async fn fetch(&self, max_age: Duration) -> SourceFetch<SensorReading> {
        let reading = match self.db.latest_sensor_reading() {
            Ok(Some(reading)) => reading,
            Ok(None) => return SourceFetch::unavailable("sensor cache is empty"),
            Err(e) => {
                tracing::warn!("Sensor cache read failed: {}", e);
                return SourceFetch::unavailable(format!("sensor cache read failed: {}", e));
            }
        };

        let age = reading.age_at(Utc::now());
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::hours(1));

        if age > max_age {
            return SourceFetch::unavailable(format!(
                "latest reading is {} min old (max {} min)",
                age.num_minutes(),
                max_age.num_minutes()
            ));
        }

        if reading.data_quality < self.min_quality {
            let detail = format!(
                "data quality {:.2} below threshold {:.2}",
                reading.data_quality, self.min_quality
            );
            return SourceFetch::degraded(reading, detail);
        }

        if age * 2 > max_age {
            let detail = format!("reading is {} min old", age.num_minutes());
            return SourceFetch::degraded(reading, detail);
        }

        SourceFetch::success(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceStatus;
    use chrono::Duration as ChronoDuration;

    fn reading_aged(minutes: i64, quality_fields: bool) -> SensorReading {
        let (ph, light) = if quality_fields {
            (Some(6.5), Some(800.0))
        } else {
            (None, None)
        };
        SensorReading::validated(
            "field-01",
            Utc::now() - ChronoDuration::minutes(minutes),
            Some(22.0),
            quality_fields.then_some(60.0),
            quality_fields.then_some(50.0),
            ph,
            light,
            quality_fields.then_some(90.0),
            quality_fields.then_some(-55.0),
        )
    }

    #[tokio::test]
    async fn empty_cache_is_unavailable() {
        let gateway = SqliteSensorGateway::new(Database::open_in_memory().unwrap());
        let fetch = gateway.fetch(Duration::from_secs(3600)).await;
        assert_eq!(fetch.status(), SourceStatus::Unavailable);
    }

    #[tokio::test]
    async fn fresh_reading_is_success() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sensor_reading(&reading_aged(5, true)).unwrap();
        let gateway = SqliteSensorGateway::new(db);
        let fetch = gateway.fetch(Duration::from_secs(3600)).await;
        assert_eq!(fetch.status(), SourceStatus::Success);
        assert!(fetch.value().is_some());
    }

    #[tokio::test]
    async fn stale_reading_is_unavailable() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sensor_reading(&reading_aged(120, true)).unwrap();
        let gateway = SqliteSensorGateway::new(db);
        let fetch = gateway.fetch(Duration::from_secs(3600)).await;
        assert_eq!(fetch.status(), SourceStatus::Unavailable);
    }

    #[tokio::test]
    async fn old_but_fresh_enough_reading_is_degraded() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sensor_reading(&reading_aged(40, true)).unwrap();
        let gateway = SqliteSensorGateway::new(db);
        let fetch = gateway.fetch(Duration::from_secs(3600)).await;
        assert_eq!(fetch.status(), SourceStatus::Degraded);
        assert!(fetch.value().is_some());
    }

    #[tokio::test]
    async fn low_quality_reading_is_degraded() {
        let db = Database::open_in_memory().unwrap();
        // only temperature valid -> quality 1/7
        db.insert_sensor_reading(&reading_aged(5, false)).unwrap();
        let gateway = SqliteSensorGateway::new(db);
        let fetch = gateway.fetch(Duration::from_secs(3600)).await;
        assert_eq!(fetch.status(), SourceStatus::Degraded);
    }
}
