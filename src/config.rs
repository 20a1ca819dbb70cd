use crate::error::{CropSightError, Result};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub field: FieldConfig,
    pub sensors: SensorFeedConfig,
    pub imagery: Option<ImageryServiceConfig>,
    pub stress: Option<StressServiceConfig>,
    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorFeedConfig {
    /// Readings older than this are unusable.
    pub max_age_minutes: u64,
    /// Minimum data quality before the gateway reports a reading as degraded.
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
    /// Trailing window handed to trend analysis and the stress model.
    #[serde(default = "default_history_hours")]
    pub history_window_hours: u32,
}

fn default_min_quality() -> f64 {
    0.5
}

fn default_history_hours() -> u32 {
    24
}

#[derive(Clone, Deserialize, Serialize)]
pub struct ImageryServiceConfig {
    pub url: String,
    pub api_key: String,
    /// Image reference to classify; omitted means a synthetic assessment.
    pub image_reference: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl std::fmt::Debug for ImageryServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageryServiceConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("image_reference", &self.image_reference)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct StressServiceConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl std::fmt::Debug for StressServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StressServiceConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
    #[serde(default = "default_map_seed")]
    pub map_seed: u64,
    #[serde(default = "default_zone_count")]
    pub synthetic_zone_count: usize,
}

fn default_source_timeout() -> u64 {
    10
}

fn default_map_seed() -> u64 {
    0x43_52_4f_50
}

fn default_zone_count() -> usize {
    3
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            source_timeout_secs: default_source_timeout(),
            map_seed: default_map_seed(),
            synthetic_zone_count: default_zone_count(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(CropSightError::Config(format!(
                "Config file not found at {:?}. Run `cropsight init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| CropSightError::Config(format!("Failed to read config: {}", e)))?;

        // Substitute environment variables
        let config_str = Self::substitute_env_vars(&config_str);

        let config: Config = serde_yaml::from_str(&config_str)
            .map_err(|e| CropSightError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.field.latitude) {
            return Err(CropSightError::InvalidData(format!(
                "latitude {} outside [-90, 90]",
                self.field.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.field.longitude) {
            return Err(CropSightError::InvalidData(format!(
                "longitude {} outside [-180, 180]",
                self.field.longitude
            )));
        }
        if self.sensors.max_age_minutes == 0 {
            return Err(CropSightError::InvalidData(
                "sensors.max_age_minutes must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sensors.min_quality) {
            return Err(CropSightError::InvalidData(format!(
                "sensors.min_quality {} outside [0, 1]",
                self.sensors.min_quality
            )));
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("cropsight").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| CropSightError::Config("Cannot determine config directory".into()))?
            .join("cropsight")
            .join("config.yaml");
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/cropsight/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CropSightError::Config("Cannot determine config directory".into()))?
            .join("cropsight");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("No configuration found. Let's set up CropSight!");
        println!();

        // --- Field Profile ---
        println!("Field Profile");
        let field_name: String = Input::new()
            .with_prompt("  Field name")
            .default("North Field".into())
            .interact_text()
            .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

        let latitude: f64 = Input::new()
            .with_prompt("  Latitude")
            .default(39.86)
            .interact_text()
            .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

        let longitude: f64 = Input::new()
            .with_prompt("  Longitude")
            .default(-75.79)
            .interact_text()
            .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Sensor feed ---
        println!("Sensor Feed");
        let max_age_minutes: u64 = Input::new()
            .with_prompt("  Max reading age (minutes)")
            .default(60)
            .interact_text()
            .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

        println!();

        // --- Imagery classifier (optional) ---
        println!("Imagery Classifier (leave URL blank to skip)");
        let imagery_url: String = Input::new()
            .with_prompt("  URL")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

        let imagery = if imagery_url.is_empty() {
            None
        } else {
            let api_key: String = Password::new()
                .with_prompt("  API key")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

            Some(ImageryServiceConfig {
                url: imagery_url,
                api_key,
                image_reference: None,
                enabled: true,
            })
        };

        println!();

        // --- Stress model (optional) ---
        println!("Stress Prediction Service (leave URL blank to skip)");
        let stress_url: String = Input::new()
            .with_prompt("  URL")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

        let stress = if stress_url.is_empty() {
            None
        } else {
            let api_key: String = Password::new()
                .with_prompt("  API key")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| CropSightError::Config(format!("Input error: {}", e)))?;

            Some(StressServiceConfig {
                url: stress_url,
                api_key,
                enabled: true,
            })
        };

        println!();

        let config = Config {
            field: FieldConfig {
                name: field_name,
                latitude,
                longitude,
            },
            sensors: SensorFeedConfig {
                max_age_minutes,
                min_quality: default_min_quality(),
                history_window_hours: default_history_hours(),
            },
            imagery,
            stress,
            engine: EngineSettings::default(),
        };

        // Write to default config path
        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| CropSightError::Config(format!("Failed to serialize config: {}", e)))?;

        // Write with a header comment
        let content = format!(
            "# CropSight Configuration\n# Generated by `cropsight init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        // Then check env var
        if let Ok(dir) = std::env::var("CROPSIGHT_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        // Use XDG data directory
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CropSightError::Config("Cannot determine data directory".into()))?
            .join("cropsight");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("cropsight.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field: FieldConfig {
                name: "North Field".into(),
                latitude: 39.86,
                longitude: -75.79,
            },
            sensors: SensorFeedConfig {
                max_age_minutes: 60,
                min_quality: default_min_quality(),
                history_window_hours: default_history_hours(),
            },
            imagery: None,
            stress: None,
            engine: EngineSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_substitution_replaces_known_vars() {
        std::env::set_var("CROPSIGHT_TEST_KEY", "secret123");
        let content = "api_key: ${CROPSIGHT_TEST_KEY}\nother: ${CROPSIGHT_UNSET_VAR}";
        let substituted = Config::substitute_env_vars(content);
        assert!(substituted.contains("secret123"));
        // unknown vars are left in place
        assert!(substituted.contains("${CROPSIGHT_UNSET_VAR}"));
    }

    #[test]
    fn default_config_parses_round_trip() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.sensors.max_age_minutes, 60);
        assert!(parsed.imagery.is_none());
    }

    #[test]
    fn engine_settings_default_when_absent() {
        let yaml = r#"
field:
  name: Test
  latitude: 1.0
  longitude: 2.0
sensors:
  max_age_minutes: 30
imagery: null
stress: null
"#;
        let parsed: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.engine.source_timeout_secs, 10);
        assert_eq!(parsed.sensors.history_window_hours, 24);
        assert_eq!(parsed.engine.synthetic_zone_count, 3);
    }

    #[test]
    fn debug_redacts_api_keys() {
        let imagery = ImageryServiceConfig {
            url: "http://localhost".into(),
            api_key: "supersecret".into(),
            image_reference: None,
            enabled: true,
        };
        let debug = format!("{:?}", imagery);
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("REDACTED"));
    }
}
