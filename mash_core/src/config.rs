//! Configuration file support for the mash calculator.
//!
//! Two files are involved:
//! - the application config, `$XDG_CONFIG_HOME/mashcalc/config.toml`
//! - the initial parameter payload (JSON), loaded once at startup

use crate::equations::DEFAULT_REST_TEMP;
use crate::{Error, ParameterKey, ParameterStore, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub payload: PayloadConfig,

    #[serde(default)]
    pub mash: MashConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where the initial parameter payload lives
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayloadConfig {
    #[serde(default = "default_payload_path")]
    pub path: PathBuf,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            path: default_payload_path(),
        }
    }
}

/// Calculation switches
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MashConfig {
    /// Count hop absorption in the runoff volume
    #[serde(default = "default_track_hops")]
    pub track_hops: bool,

    /// Target of a freshly added first rest
    #[serde(default = "default_rest_temperature")]
    pub default_rest_temperature: f64,
}

impl Default for MashConfig {
    fn default() -> Self {
        Self {
            track_hops: default_track_hops(),
            default_rest_temperature: default_rest_temperature(),
        }
    }
}

/// Result table rendering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
        }
    }
}

// Default value functions
fn config_base_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mashcalc")
}

fn default_payload_path() -> PathBuf {
    config_base_dir().join("payload.json")
}

fn default_track_hops() -> bool {
    true
}

fn default_rest_temperature() -> f64 {
    DEFAULT_REST_TEMP
}

fn default_precision() -> usize {
    2
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        config_base_dir().join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

// ============================================================================
// Initial parameter payload
// ============================================================================

/// Equipment and process parameters supplied once at startup
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InitialParameters {
    pub mash_thickness: f64,
    pub grain_temp: f64,
    pub batch_volume: f64,
    pub evaporation_rate: f64,
    pub equipment_loss: f64,
    pub trub_loss: f64,
    pub mash_tun_volume: f64,
}

impl Default for InitialParameters {
    fn default() -> Self {
        Self {
            mash_thickness: 3.0,
            grain_temp: 20.0,
            batch_volume: 20.0,
            evaporation_rate: 3.0,
            equipment_loss: 1.0,
            trub_loss: 1.0,
            mash_tun_volume: 40.0,
        }
    }
}

impl InitialParameters {
    /// Load the payload from `path`
    ///
    /// A missing file yields the built-in defaults. A file that exists but
    /// does not parse or validate is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No payload found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let payload: InitialParameters = serde_json::from_str(&contents)?;
        payload.validate()?;
        tracing::info!("Loaded initial parameters from {:?}", path);
        Ok(payload)
    }

    /// Field values paired with the parameter they initialise
    pub fn fields(&self) -> [(ParameterKey, f64); 7] {
        [
            (ParameterKey::MashThickness, self.mash_thickness),
            (ParameterKey::GrainTemp, self.grain_temp),
            (ParameterKey::BatchVolume, self.batch_volume),
            (ParameterKey::EvaporationRate, self.evaporation_rate),
            (ParameterKey::EquipmentLoss, self.equipment_loss),
            (ParameterKey::TrubLoss, self.trub_loss),
            (ParameterKey::MashTunVolume, self.mash_tun_volume),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }
        if self.mash_thickness == 0.0 {
            return Err(Error::Config("mash_thickness must be greater than 0".into()));
        }
        Ok(())
    }

    /// Copy every field into the parameter store
    pub fn apply<P: ParameterStore>(&self, store: &mut P) {
        for (key, value) in self.fields() {
            store.set(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FormParameters;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.mash.track_hops);
        assert_eq!(config.mash.default_rest_temperature, 68.0);
        assert_eq!(config.display.precision, 2);
        assert!(config.payload.path.ends_with("payload.json"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.mash.track_hops = false;
        config.display.precision = 3;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert!(!parsed.mash.track_hops);
        assert_eq!(parsed.display.precision, 3);
        assert_eq!(parsed.payload.path, config.payload.path);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[mash]
track_hops = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.mash.track_hops);
        assert_eq!(config.mash.default_rest_temperature, 68.0); // default
        assert_eq!(config.display.precision, 2); // default
    }

    #[test]
    fn test_missing_payload_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let payload = InitialParameters::load(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(payload, InitialParameters::default());
    }

    #[test]
    fn test_load_payload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("payload.json");
        std::fs::write(
            &path,
            r#"{
                "mash_thickness": 2.5,
                "grain_temp": 18.0,
                "batch_volume": 23.0,
                "evaporation_rate": 4.0,
                "equipment_loss": 1.5,
                "trub_loss": 2.0,
                "mash_tun_volume": 36.0
            }"#,
        )
        .unwrap();

        let payload = InitialParameters::load(&path).unwrap();
        assert_eq!(payload.mash_thickness, 2.5);
        assert_eq!(payload.mash_tun_volume, 36.0);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("payload.json");
        std::fs::write(&path, r#"{ "mash_thickness": 2.5 }"#).unwrap();

        assert!(matches!(InitialParameters::load(&path), Err(Error::Json(_))));
    }

    #[test]
    fn test_payload_validation() {
        let payload = InitialParameters {
            mash_thickness: 0.0,
            ..InitialParameters::default()
        };
        assert!(matches!(payload.validate(), Err(Error::Config(_))));

        let payload = InitialParameters {
            trub_loss: -1.0,
            ..InitialParameters::default()
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_apply_payload() {
        let mut params = FormParameters::new();
        InitialParameters::default().apply(&mut params);

        assert_eq!(params.get(ParameterKey::MashThickness).unwrap(), 3.0);
        assert_eq!(params.get(ParameterKey::MashTunVolume).unwrap(), 40.0);
        // Not part of the payload
        assert!(params.get(ParameterKey::GrainMass).is_err());
    }
}
