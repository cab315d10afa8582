//! Per-interaction state: the validated place and the last generated map.
//!
//! State is a plain value threaded through the operations that change it.

use chrono::{DateTime, Utc};
use geojson::FeatureCollection;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{AssemblyWarning, Result};
use crate::models::PlaceDescriptor;
use crate::overpass::Mode;
use crate::stats::{Statistics, StatisticsCalculator};

pub const GEOJSON_MEDIA_TYPE: &str = "application/json";

/// Result of one successful generate call
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub place: PlaceDescriptor,
    pub mode: Mode,
    pub collection: FeatureCollection,
    pub warnings: Vec<AssemblyWarning>,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedMap {
    /// `{display_name}_{mode}.geojson`, with path separators replaced
    pub fn download_name(&self) -> String {
        let name: String = self
            .place
            .display_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}_{}.geojson", name, self.mode)
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        serde_json::to_string(&self.collection).map_err(|e| std::io::Error::other(e).into())
    }

    pub fn statistics(&self, top_n: usize) -> Statistics {
        StatisticsCalculator::from_collection(&self.collection).summary(top_n)
    }

    /// Write the collection into `dir` under its download name
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.download_name());
        fs::write(&path, self.to_geojson_string()?)?;
        info!(
            "Wrote {} features to {}",
            self.collection.features.len(),
            path.display()
        );
        Ok(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub place: Option<PlaceDescriptor>,
    pub current: Option<GeneratedMap>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a place. A result generated for a previous place is discarded.
    pub fn with_place(self, place: PlaceDescriptor) -> Self {
        let current = self.current.filter(|map| map.place == place);
        Self {
            place: Some(place),
            current,
        }
    }

    /// Replace the current result
    pub fn with_result(self, map: GeneratedMap) -> Self {
        Self {
            place: self.place.or_else(|| Some(map.place.clone())),
            current: Some(map),
        }
    }
}
