//! Runtime configuration, loaded from an optional TOML file.
//!
//! Every field has a default so an empty file (or no file at all) is valid.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_USER_AGENT: &str = "Placeshape/0.1 (GeoJSON generator)";

/// Overpass maps relation `r` to area `r + 3600000000`
pub const RELATION_AREA_OFFSET: i64 = 3_600_000_000;

/// Highway subtypes left out of the street network
pub const EXCLUDED_HIGHWAYS: &[&str] = &[
    "path",
    "footway",
    "cycleway",
    "bridleway",
    "steps",
    "platform",
    "construction",
];

/// Upper bound on streets fan-out cells (`grid_rows * grid_cols`)
pub const MAX_GRID_CELLS: usize = 256;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub nominatim: NominatimConfig,
    pub overpass: OverpassConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NominatimConfig {
    pub url: String,
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OverpassConfig {
    pub url: String,
    pub area_id_offset: i64,
    pub excluded_highways: Vec<String>,
    /// Drop ways tagged `area=yes` from street queries
    pub exclude_area_yes: bool,
    /// Sub-queries in flight at once during fan-out
    pub max_concurrent: usize,
    pub grid_rows: usize,
    pub grid_cols: usize,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            area_id_offset: RELATION_AREA_OFFSET,
            excluded_highways: EXCLUDED_HIGHWAYS.iter().map(|s| s.to_string()).collect(),
            exclude_area_yes: true,
            max_concurrent: 4,
            grid_rows: 1,
            grid_cols: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout; the client default applies when unset
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("nominatim.url", &self.nominatim.url),
            ("overpass.url", &self.overpass.url),
        ] {
            Url::parse(value).map_err(|e| Error::Config(format!("{} is invalid: {}", name, e)))?;
        }
        if self.overpass.max_concurrent == 0 {
            return Err(Error::Config(
                "overpass.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.overpass.grid_rows == 0 || self.overpass.grid_cols == 0 {
            return Err(Error::Config(
                "overpass.grid_rows and overpass.grid_cols must be at least 1".to_string(),
            ));
        }
        match self.overpass.grid_rows.checked_mul(self.overpass.grid_cols) {
            Some(cells) if cells <= MAX_GRID_CELLS => {}
            _ => {
                return Err(Error::Config(format!(
                    "overpass grid must have at most {} cells",
                    MAX_GRID_CELLS
                )))
            }
        }
        if self.overpass.area_id_offset < 0 {
            return Err(Error::Config(
                "overpass.area_id_offset must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
