use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::db::Database;
use crate::engine::rules::AlertEngine;
use crate::engine::{AnalysisEngine, AnalysisOutput, EngineConfig};
use crate::error::{CropSightError, Result};
use crate::models::{HealthMap, ImageryRequest, SourceFetch};
use crate::sources::{
    stub, ImageryServiceClient, ImagerySource, SensorSource, SqliteSensorGateway,
    StressServiceClient, StressSource,
};
use std::time::Duration;

/// Cached readings older than a week are dropped on each run.
const CACHE_RETENTION_HOURS: u32 = 24 * 7;

pub async fn run(mut cli: Cli) -> Result<()> {
    let command = cli.command.take();
    match command {
        Some(Commands::Init) => cmd_init(),
        Some(Commands::Check) => cmd_check(&cli).await,
        Some(Commands::Run { format, demo }) => cmd_run(&cli, format, demo).await,
        None => cmd_run(&cli, OutputFormat::Text, false).await,
    }
}

fn cmd_init() -> Result<()> {
    if Config::exists(None) {
        println!("Existing configuration found; it will be replaced.");
    }
    let (_, path) = Config::setup_interactive()?;
    println!("Setup complete. Config written to {}", path.display());
    Ok(())
}

pub async fn cmd_run(cli: &Cli, format: OutputFormat, demo: bool) -> Result<()> {
    if demo {
        let engine = demo_engine();
        let history = stub::demo_history();
        let output = engine.run_analysis(&history).await;
        print_output(&output, format, "demo field");
        return Ok(());
    }

    let config = Config::load(cli.config.clone())?;
    let db = Database::open(cli.data_dir.as_ref())?;

    // Cache maintenance belongs to the adapter side, not the engine
    if let Err(e) = db.prune_sensor_readings(CACHE_RETENTION_HOURS) {
        tracing::warn!("Could not prune sensor cache: {}", e);
    }

    let history = db
        .recent_sensor_readings(config.sensors.history_window_hours)
        .unwrap_or_else(|e| {
            tracing::warn!("Could not load reading history: {}", e);
            Vec::new()
        });

    let engine = configured_engine(&config, db);
    let output = engine.run_analysis(&history).await;
    print_output(&output, format, &config.field.name);
    Ok(())
}

pub async fn cmd_check(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.clone())?;
    let db = Database::open(cli.data_dir.as_ref())?;
    println!("Sensor cache: {}", db.path().display());

    let mut parts = Vec::new();

    let gateway = SqliteSensorGateway::new(db);
    if gateway.test_connection() {
        parts.push("Sensors: OK".to_string());
    } else {
        parts.push("Sensors: OFFLINE".to_string());
    }

    match configured_imagery_client(&config) {
        Some(client) => {
            if client.test_connection().await {
                parts.push("Imagery: OK".to_string());
            } else {
                parts.push("Imagery: OFFLINE".to_string());
            }
        }
        None => parts.push("Imagery: NOT CONFIGURED".to_string()),
    }

    match configured_stress_client(&config) {
        Some(client) => {
            if client.test_connection().await {
                parts.push("Stress: OK".to_string());
            } else {
                parts.push("Stress: OFFLINE".to_string());
            }
        }
        None => parts.push("Stress: NOT CONFIGURED".to_string()),
    }

    println!("{}", parts.join(" | "));

    let rules = AlertEngine::new();
    let rule_names: Vec<&str> = rules.list_rules().iter().map(|(_, name)| *name).collect();
    println!("Alert rules: {}", rule_names.join(", "));

    if parts.iter().all(|p| !p.ends_with("OK")) {
        return Err(CropSightError::DataSourceUnavailable(
            "no data source is reachable; analysis will run in fallback mode".into(),
        ));
    }

    Ok(())
}

fn configured_imagery_client(config: &Config) -> Option<ImageryServiceClient> {
    config
        .imagery
        .as_ref()
        .filter(|c| c.enabled && !c.url.is_empty())
        .map(|c| ImageryServiceClient::new(c.clone()))
}

fn configured_stress_client(config: &Config) -> Option<StressServiceClient> {
    config
        .stress
        .as_ref()
        .filter(|c| c.enabled && !c.url.is_empty())
        .map(|c| StressServiceClient::new(c.clone()))
}

type BoxedEngine =
    AnalysisEngine<Box<dyn SensorSource>, Box<dyn ImagerySource>, Box<dyn StressSource>>;

fn configured_engine(config: &Config, db: Database) -> BoxedEngine {
    let sensor: Box<dyn SensorSource> = Box::new(
        SqliteSensorGateway::new(db).with_min_quality(config.sensors.min_quality),
    );

    let imagery: Box<dyn ImagerySource> = match configured_imagery_client(config) {
        Some(client) => Box::new(client),
        None => {
            tracing::info!("Imagery classifier not configured; source will be unavailable");
            Box::new(stub::StaticImagerySource::unavailable())
        }
    };

    let stress: Box<dyn StressSource> = match configured_stress_client(config) {
        Some(client) => Box::new(client),
        None => {
            tracing::info!("Stress model not configured; source will be unavailable");
            Box::new(stub::StaticStressSource::unavailable())
        }
    };

    let imagery_request = match config.imagery.as_ref().and_then(|c| c.image_reference.clone()) {
        Some(reference) => ImageryRequest::Reference(reference),
        None => ImageryRequest::default(),
    };

    let engine_config = EngineConfig {
        sensor_max_age: Duration::from_secs(config.sensors.max_age_minutes * 60),
        source_timeout: Duration::from_secs(config.engine.source_timeout_secs),
        map_seed: config.engine.map_seed,
        synthetic_zone_count: config.engine.synthetic_zone_count,
        imagery_request,
    };

    AnalysisEngine::new(sensor, imagery, stress, engine_config)
}

fn demo_engine() -> BoxedEngine {
    let sensor: Box<dyn SensorSource> = Box::new(stub::StaticSensorSource::new(
        SourceFetch::success(stub::demo_reading()),
    ));
    let imagery: Box<dyn ImagerySource> = Box::new(stub::StaticImagerySource::new(
        SourceFetch::success(stub::demo_imagery()),
    ));
    let stress: Box<dyn StressSource> = Box::new(stub::StaticStressSource::new(
        SourceFetch::success(stub::demo_stress()),
    ));

    AnalysisEngine::new(sensor, imagery, stress, EngineConfig::default())
}

fn print_output(output: &AnalysisOutput, format: OutputFormat, field_name: &str) {
    match format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "field": field_name,
                "alert_message": &output.alert_message,
                "stats": &output.stats,
                "health_map": &output.health_map,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Text => {
            let stats = &output.stats;
            println!("CropSight analysis for {}", field_name);
            println!(
                "Tier: {} ({})  Confidence: {:.0}%",
                stats.tier,
                stats.data_source,
                stats.overall_confidence * 100.0
            );
            println!("Alert: {}", output.alert_message);
            println!(
                "Fused health: {:.2}  Map: mean {:.2}, healthy {:.1}%, stressed {:.1}%, waterlogged {:.1}%",
                stats.fused_health_score,
                stats.mean_health,
                stats.healthy_area_percent,
                stats.stressed_area_percent,
                stats.waterlogged_area_percent
            );
            println!(
                "Sensor: {:.1}°C, {:.0}% RH, {:.0}% soil moisture, pH {:.1} (quality {:.0}%)",
                stats.temperature_c,
                stats.humidity_percent,
                stats.soil_moisture_percent,
                stats.ph,
                stats.data_quality * 100.0
            );
            println!(
                "Next hour: {:.1}°C, {:.0}% RH, {:.0}% soil moisture",
                stats.predicted_temperature_c,
                stats.predicted_humidity_percent,
                stats.predicted_soil_moisture_percent
            );
            println!();
            println!("{}", render_ascii_map(&output.health_map, 50, 20));
        }
    }
}

/// Coarse terminal rendering of the health map: block-averaged cells mapped
/// onto a darkness ramp (worst health renders densest).
fn render_ascii_map(map: &HealthMap, columns: usize, rows: usize) -> String {
    const RAMP: &[u8] = b"@%#*+=-:. ";

    let mut out = String::with_capacity((columns + 1) * rows);
    for row in 0..rows {
        for col in 0..columns {
            let x0 = col * map.width() / columns;
            let x1 = ((col + 1) * map.width() / columns).max(x0 + 1);
            let y0 = row * map.height() / rows;
            let y1 = ((row + 1) * map.height() / rows).max(y0 + 1);

            let mut sum = 0.0;
            let mut count = 0usize;
            for y in y0..y1 {
                for x in x0..x1 {
                    sum += map.get(x, y);
                    count += 1;
                }
            }
            let mean = sum / count as f64;
            let index = ((mean * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1);
            out.push(RAMP[index] as char);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_map_has_requested_dimensions() {
        let map = HealthMap::uniform(0.8);
        let rendered = render_ascii_map(&map, 40, 10);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() == 40));
    }

    #[test]
    fn ascii_ramp_tracks_health() {
        let healthy = render_ascii_map(&HealthMap::uniform(1.0), 4, 2);
        let critical = render_ascii_map(&HealthMap::uniform(0.0), 4, 2);
        assert!(healthy.contains(' '));
        assert!(critical.contains('@'));
    }
}
