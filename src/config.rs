use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// `http(s)://` URL or a local path to the communes CSV.
    pub data_source: String,
    pub basemap: Option<PathBuf>, // GeoJSON outlines drawn under the dots
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    pub center: [f64; 2], // [lon, lat]
    pub scale_factor: f64, // projection scale = width * scale_factor
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            center: [2.5, 46.5],
            scale_factor: 2.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub padding: f64, // band padding, fraction of the step
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 750.0,
            height: 300.0,
            padding: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub lookup_radius: f64, // degrees
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: PathBuf::from("static"),
            lookup_radius: 0.05,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub snapshot: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("output/map.png"),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
