//! Configuration system for the oxidized-horizon session host

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    pub session: SessionConfig,
    pub graphics: GraphicsConfig,
    pub driver: DriverConfig,
}

/// Options applied once when the emulated device is brought up.
///
/// Supplied at initialization and never mutated afterward; the session
/// manager hands the set to the core provider verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Map guest memory directly into the host address space
    pub host_mapped_memory: bool,
    /// Use the alternate CPU execution engine instead of the translator
    pub alternate_cpu_engine: bool,
    pub system_language: SystemLanguage,
    pub region: RegionCode,
    pub vsync: bool,
    pub docked_mode: bool,
    /// Keep the just-in-time translation cache across runs
    pub translation_cache: bool,
    pub network_access: bool,
    /// IANA timezone identifier for the emulated clock
    pub time_zone: String,
    /// Continue past unimplemented OS services instead of aborting
    pub ignore_missing_services: bool,
}

/// Emulated system language.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum SystemLanguage {
    Japanese,
    #[default]
    AmericanEnglish,
    French,
    German,
    Italian,
    Spanish,
    Chinese,
    Korean,
    Dutch,
    Portuguese,
    Russian,
    Taiwanese,
    BritishEnglish,
    CanadianFrench,
    LatinAmericanSpanish,
    SimplifiedChinese,
    TraditionalChinese,
    BrazilianPortuguese,
}

/// Console region code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum RegionCode {
    Japan,
    #[default]
    Usa,
    Europe,
    Australia,
    China,
    Korea,
    Taiwan,
}

/// Graphics backend options selected by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub shader_cache: bool,
    pub texture_recompression: bool,
    pub resolution_scale: f32,
}

/// Alternate graphics-driver selection and staging locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Path to the selected driver package; `None` uses the system driver
    pub selected_driver: Option<PathBuf>,
    /// Root directory under which a private driver copy is staged
    pub staging_dir: PathBuf,
    /// Directory holding the host's own native libraries
    pub native_library_dir: PathBuf,
}

// Default implementations

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host_mapped_memory: true,
            alternate_cpu_engine: false,
            system_language: SystemLanguage::default(),
            region: RegionCode::default(),
            vsync: true,
            docked_mode: true,
            translation_cache: true,
            network_access: false,
            time_zone: "UTC".to_string(),
            ignore_missing_services: false,
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            shader_cache: true,
            texture_recompression: false,
            resolution_scale: 1.0,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxidized-horizon");

        Self {
            selected_driver: None,
            staging_dir: base.clone(),
            native_library_dir: base.join("native"),
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxidized-horizon")
            .join("config.toml")
    }
}
