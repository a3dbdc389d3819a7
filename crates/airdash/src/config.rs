use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `service_key` from the file.
pub const SERVICE_KEY_ENV: &str = "AIRDASH_SERVICE_KEY";

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the dashboard front-end, served for non-API paths
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("public"))
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live of cached upstream responses, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    600
}

/// Map topology snapshot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeodataConfig {
    /// Local snapshot file; once it exists it is served without re-fetching
    #[serde(default = "default_geo_cache_file")]
    pub cache_file: PathBuf,
}

impl Default for GeodataConfig {
    fn default() -> Self {
        Self {
            cache_file: default_geo_cache_file(),
        }
    }
}

fn default_geo_cache_file() -> PathBuf {
    PathBuf::from("geo-cache.json")
}

/// Upstream gateway locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// AirKorea realtime measurement service
    #[serde(default = "default_air_quality_base")]
    pub air_quality_base: String,
    /// AirKorea measuring-station service
    #[serde(default = "default_station_base")]
    pub station_base: String,
    /// KMA short-range forecast service
    #[serde(default = "default_weather_base")]
    pub weather_base: String,
    /// KMA living weather index service
    #[serde(default = "default_living_index_base")]
    pub living_index_base: String,
    /// Administrative boundary TopoJSON
    #[serde(default = "default_geodata_url")]
    pub geodata_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            air_quality_base: default_air_quality_base(),
            station_base: default_station_base(),
            weather_base: default_weather_base(),
            living_index_base: default_living_index_base(),
            geodata_url: default_geodata_url(),
        }
    }
}

fn default_air_quality_base() -> String {
    "https://apis.data.go.kr/B552584/ArpltnInforInqireSvc".to_string()
}

fn default_station_base() -> String {
    "https://apis.data.go.kr/B552584/MsrstnInfoInqireSvc".to_string()
}

fn default_weather_base() -> String {
    "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0".to_string()
}

fn default_living_index_base() -> String {
    "https://apis.data.go.kr/1360000/LivingWthrIdxServiceV4".to_string()
}

fn default_geodata_url() -> String {
    "https://raw.githubusercontent.com/southkorea/southkorea-maps/master/kostat/2018/json/skorea-municipalities-2018-topo.json".to_string()
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Decoded data.go.kr service key
    #[serde(default)]
    pub service_key: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub geodata: GeodataConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Take the service key from `AIRDASH_SERVICE_KEY` when it is set.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(SERVICE_KEY_ENV) {
            if !key.trim().is_empty() {
                self.service_key = key.trim().to_string();
            }
        }
    }

    /// Check the settings the server cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "service_key is empty (set it in the config file or {})",
                SERVICE_KEY_ENV
            )));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// `bind:port` for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
