use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive plausible range for a physical sensor parameter.
///
/// Values outside the range are discarded at the adapter boundary (set to
/// `None` with a data-quality penalty), never silently clamped.
#[derive(Debug, Clone, Copy)]
pub struct PlausibleRange {
    pub min: f64,
    pub max: f64,
}

impl PlausibleRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

pub const TEMPERATURE_RANGE: PlausibleRange = PlausibleRange {
    min: -50.0,
    max: 60.0,
};
pub const HUMIDITY_RANGE: PlausibleRange = PlausibleRange {
    min: 0.0,
    max: 100.0,
};
pub const SOIL_MOISTURE_RANGE: PlausibleRange = PlausibleRange {
    min: 0.0,
    max: 100.0,
};
pub const PH_RANGE: PlausibleRange = PlausibleRange {
    min: 0.0,
    max: 14.0,
};
pub const LIGHT_RANGE: PlausibleRange = PlausibleRange {
    min: 0.0,
    max: 2000.0,
};
pub const BATTERY_RANGE: PlausibleRange = PlausibleRange {
    min: 0.0,
    max: 100.0,
};
pub const SIGNAL_RANGE: PlausibleRange = PlausibleRange {
    min: -120.0,
    max: 0.0,
};

/// A validated in-field sensor reading.
///
/// Physical fields are `None` when the raw value was missing, non-finite, or
/// outside its plausible range. `data_quality` reflects how many of the
/// physical fields survived validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub temperature_c: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub soil_moisture_percent: Option<f64>,
    pub ph: Option<f64>,
    pub light_intensity_lux: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub battery_percent: Option<f64>,
    pub signal_strength_dbm: Option<f64>,
    pub data_quality: f64,
}

impl SensorReading {
    pub fn new(device_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            device_id: device_id.into(),
            temperature_c: None,
            humidity_percent: None,
            soil_moisture_percent: None,
            ph: None,
            light_intensity_lux: None,
            latitude: None,
            longitude: None,
            battery_percent: None,
            signal_strength_dbm: None,
            data_quality: 0.0,
        }
    }

    /// Validate raw values against their plausible ranges and compute the
    /// data-quality score. Call once at the adapter boundary.
    #[allow(clippy::too_many_arguments)]
    pub fn validated(
        device_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        temperature_c: Option<f64>,
        humidity_percent: Option<f64>,
        soil_moisture_percent: Option<f64>,
        ph: Option<f64>,
        light_intensity_lux: Option<f64>,
        battery_percent: Option<f64>,
        signal_strength_dbm: Option<f64>,
    ) -> Self {
        let mut reading = Self::new(device_id, timestamp);
        reading.temperature_c = accept(temperature_c, &TEMPERATURE_RANGE);
        reading.humidity_percent = accept(humidity_percent, &HUMIDITY_RANGE);
        reading.soil_moisture_percent = accept(soil_moisture_percent, &SOIL_MOISTURE_RANGE);
        reading.ph = accept(ph, &PH_RANGE);
        reading.light_intensity_lux = accept(light_intensity_lux, &LIGHT_RANGE);
        reading.battery_percent = accept(battery_percent, &BATTERY_RANGE);
        reading.signal_strength_dbm = accept(signal_strength_dbm, &SIGNAL_RANGE);
        reading.data_quality = reading.compute_quality();
        reading
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Fraction of physical fields that carry a valid value.
    fn compute_quality(&self) -> f64 {
        let fields = [
            self.temperature_c,
            self.humidity_percent,
            self.soil_moisture_percent,
            self.ph,
            self.light_intensity_lux,
            self.battery_percent,
            self.signal_strength_dbm,
        ];
        let valid = fields.iter().filter(|f| f.is_some()).count();
        valid as f64 / fields.len() as f64
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.timestamp
    }
}

fn accept(value: Option<f64>, range: &PlausibleRange) -> Option<f64> {
    value.filter(|v| range.contains(*v))
}
