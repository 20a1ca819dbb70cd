use crate::db::Database;
use crate::error::Result;
use crate::models::SensorReading;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

impl Database {
    /// Insert a validated reading into the ingestion cache. Used by the
    /// external forwarder binary and by tests; the analysis path only reads.
    pub fn insert_sensor_reading(&self, reading: &SensorReading) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO sensor_data
                    (timestamp, device_id, temperature, humidity, soil_moisture,
                     ph_level, light_intensity, latitude, longitude,
                     battery_level, signal_strength, data_quality)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    reading.timestamp.to_rfc3339(),
                    reading.device_id,
                    reading.temperature_c,
                    reading.humidity_percent,
                    reading.soil_moisture_percent,
                    reading.ph,
                    reading.light_intensity_lux,
                    reading.latitude,
                    reading.longitude,
                    reading.battery_percent,
                    reading.signal_strength_dbm,
                    reading.data_quality,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn latest_sensor_reading(&self) -> Result<Option<SensorReading>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM sensor_data ORDER BY timestamp DESC LIMIT 1",
                [],
                row_to_sensor_reading,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Readings from the trailing window, newest first.
    pub fn recent_sensor_readings(&self, window_hours: u32) -> Result<Vec<SensorReading>> {
        let cutoff = Utc::now() - Duration::hours(window_hours as i64);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM sensor_data WHERE timestamp >= ?1 ORDER BY timestamp DESC",
            )?;
            let rows = stmt.query_map(params![cutoff.to_rfc3339()], row_to_sensor_reading)?;
            let mut readings = Vec::new();
            for row in rows {
                readings.push(row?);
            }
            Ok(readings)
        })
    }

    /// Drop cached readings older than the retention window.
    pub fn prune_sensor_readings(&self, retain_hours: u32) -> Result<usize> {
        let cutoff = Utc::now() - Duration::hours(retain_hours as i64);
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM sensor_data WHERE timestamp < ?1",
                params![cutoff.to_rfc3339()],
            )?;
            Ok(deleted)
        })
    }
}

fn row_to_sensor_reading(row: &Row) -> rusqlite::Result<SensorReading> {
    let timestamp_str: String = row.get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(timestamp = %timestamp_str, "Unparseable timestamp in cache, using now");
            Utc::now()
        });

    // Rows were validated before insertion; re-validating here keeps the
    // plausible-range invariant even if the cache was written by an older
    // forwarder.
    let mut reading = SensorReading::validated(
        row.get::<_, String>("device_id")?,
        timestamp,
        row.get("temperature")?,
        row.get("humidity")?,
        row.get("soil_moisture")?,
        row.get("ph_level")?,
        row.get("light_intensity")?,
        row.get("battery_level")?,
        row.get("signal_strength")?,
    );
    reading.latitude = row.get("latitude")?;
    reading.longitude = row.get("longitude")?;
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_reading(minutes_ago: i64) -> SensorReading {
        SensorReading::validated(
            "field-01",
            Utc::now() - Duration::minutes(minutes_ago),
            Some(24.0),
            Some(55.0),
            Some(42.0),
            Some(6.7),
            Some(750.0),
            Some(88.0),
            Some(-60.0),
        )
    }

    #[test]
    fn latest_reading_round_trips() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.latest_sensor_reading().unwrap().is_none());

        db.insert_sensor_reading(&sample_reading(30)).unwrap();
        db.insert_sensor_reading(&sample_reading(5)).unwrap();

        let latest = db.latest_sensor_reading().unwrap().unwrap();
        assert_eq!(latest.device_id, "field-01");
        assert_eq!(latest.temperature_c, Some(24.0));
        // newest row wins
        assert!(latest.age_at(Utc::now()) < Duration::minutes(10));
    }

    #[test]
    fn recent_readings_respect_the_window() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sensor_reading(&sample_reading(30)).unwrap();
        db.insert_sensor_reading(&sample_reading(90)).unwrap();
        db.insert_sensor_reading(&sample_reading(60 * 30)).unwrap();

        let recent = db.recent_sensor_readings(2).unwrap();
        assert_eq!(recent.len(), 2);
        // newest first
        assert!(recent[0].timestamp > recent[1].timestamp);
    }

    #[test]
    fn prune_removes_old_rows() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sensor_reading(&sample_reading(10)).unwrap();
        db.insert_sensor_reading(&sample_reading(60 * 50)).unwrap();

        let deleted = db.prune_sensor_readings(24).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(db.recent_sensor_readings(24 * 7).unwrap().len(), 1);
    }
}
