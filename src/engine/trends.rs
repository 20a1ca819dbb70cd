use crate::models::{
    PlausibleRange, SensorReading, HUMIDITY_RANGE, SOIL_MOISTURE_RANGE, TEMPERATURE_RANGE,
};

/// Least-squares slope of a parameter over the history window, in units per
/// hour. Returns 0.0 with fewer than two usable points.
pub fn trend_per_hour(
    history: &[SensorReading],
    field: impl Fn(&SensorReading) -> Option<f64>,
) -> f64 {
    let Some(origin) = history.iter().map(|r| r.timestamp).min() else {
        return 0.0;
    };

    let points: Vec<(f64, f64)> = history
        .iter()
        .filter_map(|r| {
            field(r).map(|value| {
                let hours = (r.timestamp - origin).num_seconds() as f64 / 3600.0;
                (hours, value)
            })
        })
        .collect();

    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < 1e-12 {
        // all points share a timestamp
        return 0.0;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

/// Next-step prediction: current value extrapolated one hour along the
/// trend, clamped to the parameter's plausible range. Without a current
/// value the prediction is 0.0 (matching the stats record's missing-value
/// convention).
pub fn predict_next_hour(current: Option<f64>, slope: f64, range: &PlausibleRange) -> f64 {
    match current {
        Some(value) => range.clamp(value + slope),
        None => 0.0,
    }
}

/// Trend slopes and next-step predictions for the parameters the stats
/// record tracks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendSummary {
    pub temperature_trend: f64,
    pub humidity_trend: f64,
    pub moisture_trend: f64,
    pub predicted_temperature_c: f64,
    pub predicted_humidity_percent: f64,
    pub predicted_soil_moisture_percent: f64,
}

pub fn summarize_trends(current: Option<&SensorReading>, history: &[SensorReading]) -> TrendSummary {
    let temperature_trend = trend_per_hour(history, |r| r.temperature_c);
    let humidity_trend = trend_per_hour(history, |r| r.humidity_percent);
    let moisture_trend = trend_per_hour(history, |r| r.soil_moisture_percent);

    TrendSummary {
        temperature_trend,
        humidity_trend,
        moisture_trend,
        predicted_temperature_c: predict_next_hour(
            current.and_then(|r| r.temperature_c),
            temperature_trend,
            &TEMPERATURE_RANGE,
        ),
        predicted_humidity_percent: predict_next_hour(
            current.and_then(|r| r.humidity_percent),
            humidity_trend,
            &HUMIDITY_RANGE,
        ),
        predicted_soil_moisture_percent: predict_next_hour(
            current.and_then(|r| r.soil_moisture_percent),
            moisture_trend,
            &SOIL_MOISTURE_RANGE,
        ),
    }
}
