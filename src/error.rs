//! Error taxonomy for lookup, fetch, assembly and validation.

use crate::models::OsmType;

/// Operation-level failures. Every variant is recoverable by re-triggering the action.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Location not found: {0}")]
    Lookup(String),

    #[error("Map data request failed: {message}")]
    Fetch {
        message: String,
        /// Raw response payload, echoed for diagnosis
        raw: Option<String>,
    },

    #[error("Generated GeoJSON is not valid: feature {index}: {reason}")]
    Validation { index: usize, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn fetch(message: impl Into<String>, raw: Option<String>) -> Self {
        Error::Fetch {
            message: message.into(),
            raw,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Identity of a raw element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub osm_type: OsmType,
    pub osm_id: i64,
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.osm_type, self.osm_id)
    }
}

/// An element that could not be turned into geometry and was dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyWarning {
    pub element: ElementRef,
    pub reason: String,
}

impl std::fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error creating geometry for {}: {}", self.element, self.reason)
    }
}
