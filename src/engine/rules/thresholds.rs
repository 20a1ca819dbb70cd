use super::{AlertRule, RuleContext};
use crate::models::{AlertCandidate, AlertLevel, AlertSource};

/// Hard physical threshold rule over the raw sensor reading.
///
/// Every parameter carries a tight critical band and a looser warning band,
/// encoded separately so a value can be out of optimum without being
/// dangerous. Temperature: below 5 °C or above 35 °C is critical, below
/// 10 °C is the softer cold warning. Soil moisture: below 20 % critical,
/// below 30 % or above 80 % warning. pH outside [5.5, 8.0] and humidity
/// outside [20, 90] % warn. Battery below 10 % is critical, below 20 %
/// warns.
pub struct SensorThresholdRule;

const TEMP_CRITICAL_LOW: f64 = 5.0;
const TEMP_CRITICAL_HIGH: f64 = 35.0;
const TEMP_WARNING_LOW: f64 = 10.0;

const MOISTURE_CRITICAL_LOW: f64 = 20.0;
const MOISTURE_WARNING_LOW: f64 = 30.0;
const MOISTURE_WARNING_HIGH: f64 = 80.0;

const PH_WARNING_LOW: f64 = 5.5;
const PH_WARNING_HIGH: f64 = 8.0;

const HUMIDITY_WARNING_LOW: f64 = 20.0;
const HUMIDITY_WARNING_HIGH: f64 = 90.0;

const BATTERY_CRITICAL: f64 = 10.0;
const BATTERY_WARNING: f64 = 20.0;

impl AlertRule for SensorThresholdRule {
    fn id(&self) -> &'static str {
        "sensor_thresholds"
    }

    fn name(&self) -> &'static str {
        "Sensor Thresholds"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<AlertCandidate> {
        let Some(reading) = ctx.reading else {
            return Vec::new();
        };

        let mut candidates = Vec::new();

        if let Some(temp) = reading.temperature_c {
            if temp < TEMP_CRITICAL_LOW {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "temperature",
                    AlertLevel::Critical,
                    format!("Critically low temperature {:.1}°C", temp),
                ));
            } else if temp > TEMP_CRITICAL_HIGH {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "temperature",
                    AlertLevel::Critical,
                    format!("Critically high temperature {:.1}°C", temp),
                ));
            } else if temp < TEMP_WARNING_LOW {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "temperature",
                    AlertLevel::Warning,
                    format!("Temperature {:.1}°C below optimal range", temp),
                ));
            }
        }

        if let Some(moisture) = reading.soil_moisture_percent {
            if moisture < MOISTURE_CRITICAL_LOW {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "soil_moisture",
                    AlertLevel::Critical,
                    format!("Critical low soil moisture {:.0}%, irrigation needed", moisture),
                ));
            } else if moisture < MOISTURE_WARNING_LOW {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "soil_moisture",
                    AlertLevel::Warning,
                    format!("Low soil moisture {:.0}%", moisture),
                ));
            } else if moisture > MOISTURE_WARNING_HIGH {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "soil_moisture",
                    AlertLevel::Warning,
                    format!("High soil moisture {:.0}%, waterlogging risk", moisture),
                ));
            }
        }

        if let Some(ph) = reading.ph {
            if !(PH_WARNING_LOW..=PH_WARNING_HIGH).contains(&ph) {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "ph",
                    AlertLevel::Warning,
                    format!("Soil pH {:.1} outside optimal range", ph),
                ));
            }
        }

        if let Some(humidity) = reading.humidity_percent {
            if humidity > HUMIDITY_WARNING_HIGH {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "humidity",
                    AlertLevel::Warning,
                    format!("High humidity {:.0}%, disease pressure elevated", humidity),
                ));
            } else if humidity < HUMIDITY_WARNING_LOW {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "humidity",
                    AlertLevel::Warning,
                    format!("Very dry air at {:.0}% humidity", humidity),
                ));
            }
        }

        if let Some(battery) = reading.battery_percent {
            if battery < BATTERY_CRITICAL {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "battery",
                    AlertLevel::Critical,
                    format!("Sensor battery critical at {:.0}%", battery),
                ));
            } else if battery < BATTERY_WARNING {
                candidates.push(AlertCandidate::new(
                    AlertSource::Sensor,
                    "battery",
                    AlertLevel::Warning,
                    format!("Sensor battery low at {:.0}%", battery),
                ));
            }
        }

        candidates
    }
}
