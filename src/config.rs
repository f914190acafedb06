use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use std::time::Duration;
use anyhow::{Context, Result};

use crate::map::MapSettings;
use crate::types::LatLon;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub datafile: PathBuf,
    /// Worksheet to read; the first one when unset. Ignored for CSV.
    pub sheet: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    // Colina
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub zoom: u8,
    pub focus_zoom: u8,
    pub tile_url: String,
    pub tile_attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_latitude: -33.3039,
            default_longitude: -70.6722,
            zoom: 12,
            focus_zoom: 15,
            tile_url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
            tile_attribution: "&copy; OpenStreetMap contributors &copy; CARTO".to_string(),
        }
    }
}

impl MapConfig {
    pub fn settings(&self) -> MapSettings {
        MapSettings {
            default_center: LatLon::new(self.default_latitude, self.default_longitude),
            zoom: self.zoom,
            focus_zoom: self.focus_zoom,
            tile_url: self.tile_url.clone(),
            tile_attribution: self.tile_attribution.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8501, session_idle_secs: 3600 }
    }
}

impl ServerConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Configuration with every section defaulted, reading `datafile`.
    pub fn for_datafile(datafile: PathBuf) -> Self {
        Self {
            input: InputConfig { datafile, sheet: None },
            cache: CacheConfig::default(),
            map: MapConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[input]\ndatafile = \"puntos.csv\"").unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.input.datafile, PathBuf::from("puntos.csv"));
        assert!(config.input.sheet.is_none());
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
        assert_eq!(config.map.zoom, 12);
        assert_eq!(config.map.focus_zoom, 15);
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.server.session_idle(), Duration::from_secs(3600));
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let raw = r#"
            [input]
            datafile = "base.xlsx"
            sheet = "Puntos"

            [cache]
            ttl_secs = 30

            [map]
            default_latitude = -33.0
            default_longitude = -70.0
            zoom = 10

            [server]
            port = 9000
            session_idle_secs = 120
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.input.sheet.as_deref(), Some("Puntos"));
        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.map.focus_zoom, 15);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.session_idle(), Duration::from_secs(120));

        let settings = config.map.settings();
        assert_eq!(settings.default_center, LatLon::new(-33.0, -70.0));
    }

    #[test]
    fn shipped_config_reads_bundled_sample() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let config = AppConfig::load_from_file(&root.join("config.toml")).unwrap();
        assert!(root.join(&config.input.datafile).is_file());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
