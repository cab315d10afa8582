//! Lookup → query → fetch → assemble, for one place and mode.

use chrono::Utc;
use tracing::{info, warn};

use crate::assemble::osm_to_geojson;
use crate::config::Config;
use crate::error::Result;
use crate::models::{PlaceDescriptor, PlaceKind};
use crate::nominatim::NominatimClient;
use crate::overpass::{Mode, OverpassClient, QueryBuilder};
use crate::session::GeneratedMap;

pub struct Generator {
    nominatim: NominatimClient,
    overpass: OverpassClient,
    queries: QueryBuilder,
    grid: (usize, usize),
}

impl Generator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            nominatim: NominatimClient::new(config)?,
            overpass: OverpassClient::new(config)?,
            queries: QueryBuilder::from_config(&config.overpass),
            grid: (config.overpass.grid_rows, config.overpass.grid_cols),
        })
    }

    pub async fn lookup(&self, query: &str, kind: PlaceKind) -> Result<PlaceDescriptor> {
        self.nominatim.lookup(query, kind).await
    }

    /// Queries to run for a place. Streets fan out over the configured grid.
    pub fn queries_for(&self, place: &PlaceDescriptor, mode: Mode) -> Vec<String> {
        match mode {
            Mode::Boundary => vec![self.queries.boundary(place)],
            Mode::Streets => self.queries.streets_fan_out(place, self.grid.0, self.grid.1),
        }
    }

    pub async fn generate(&self, place: &PlaceDescriptor, mode: Mode) -> Result<GeneratedMap> {
        info!("Generating {} GeoJSON for {}", mode, place.display_name);

        let response = self.overpass.fetch_all(self.queries_for(place, mode)).await?;
        let assembly = osm_to_geojson(&response.elements, mode)?;

        if !assembly.warnings.is_empty() {
            warn!(
                "{} elements dropped while generating {} for {}",
                assembly.warnings.len(),
                mode,
                place.source_id()
            );
        }

        Ok(GeneratedMap {
            place: place.clone(),
            mode,
            collection: assembly.collection,
            warnings: assembly.warnings,
            generated_at: Utc::now(),
        })
    }
}
