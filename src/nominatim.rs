//! Place lookup against a Nominatim search endpoint.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{BoundingBox, OsmType, PlaceDescriptor, PlaceKind};

/// Resolves free-text place names to OSM identifiers
pub struct NominatimClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct SearchRecord {
    osm_id: i64,
    osm_type: OsmType,
    display_name: String,
    /// [min_lat, max_lat, min_lon, max_lon] as strings
    #[serde(default)]
    boundingbox: Option<Vec<String>>,
}

impl SearchRecord {
    fn into_descriptor(self) -> PlaceDescriptor {
        let bbox = self.boundingbox.as_deref().and_then(parse_bbox);
        PlaceDescriptor {
            osm_id: self.osm_id,
            osm_type: self.osm_type,
            display_name: self.display_name,
            bbox,
        }
    }
}

fn parse_bbox(parts: &[String]) -> Option<BoundingBox> {
    let values: Vec<f64> = parts.iter().filter_map(|p| p.trim().parse().ok()).collect();
    match values.as_slice() {
        [min_lat, max_lat, min_lon, max_lon] => {
            Some(BoundingBox::new(*min_lon, *min_lat, *max_lon, *max_lat))
        }
        _ => None,
    }
}

impl NominatimClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.nominatim.user_agent.as_str());
        if let Some(timeout) = config.http.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.nominatim.url.clone(),
        })
    }

    /// Search URL for a place name and kind hint
    pub fn search_url(&self, query: &str, kind: PlaceKind) -> Result<Url> {
        Url::parse_with_params(
            &self.url,
            &[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("featuretype", kind.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("Invalid Nominatim URL: {}", e)))
    }

    /// Look up the first match for `query`. No match is a lookup failure.
    pub async fn lookup(&self, query: &str, kind: PlaceKind) -> Result<PlaceDescriptor> {
        let url = self.search_url(query, kind)?;
        debug!("Nominatim search: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Nominatim request failed: {}", e);
            Error::Lookup(format!("{} ({})", query, e))
        })?;

        if !response.status().is_success() {
            warn!("Nominatim returned status {}", response.status());
            return Err(Error::Lookup(format!(
                "{} (status {})",
                query,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Lookup(format!("{} ({})", query, e)))?;

        let place = parse_search_response(query, &body)?;
        info!(
            "Resolved '{}' to {} ({})",
            query,
            place.source_id(),
            place.display_name
        );
        Ok(place)
    }
}

/// Take the first record of a search response
pub fn parse_search_response(query: &str, body: &str) -> Result<PlaceDescriptor> {
    let records: Vec<SearchRecord> = serde_json::from_str(body)
        .map_err(|e| Error::Lookup(format!("{} (malformed response: {})", query, e)))?;

    records
        .into_iter()
        .next()
        .map(SearchRecord::into_descriptor)
        .ok_or_else(|| Error::Lookup(query.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: &str = r#"[{
        "place_id": 88066702,
        "licence": "Data © OpenStreetMap contributors, ODbL 1.0. http://osm.org/copyright",
        "osm_type": "relation",
        "osm_id": 7444,
        "boundingbox": ["48.8155755", "48.9021560", "2.2241220", "2.4697602"],
        "lat": "48.8534951",
        "lon": "2.3483915",
        "display_name": "Paris, Île-de-France, France métropolitaine, France",
        "class": "boundary",
        "type": "administrative",
        "importance": 0.88
    }]"#;

    #[test]
    fn test_parse_first_record() {
        let place = parse_search_response("Paris", PARIS).unwrap();
        assert_eq!(place.osm_id, 7444);
        assert_eq!(place.osm_type, OsmType::Relation);
        assert!(place.display_name.starts_with("Paris"));

        let bbox = place.bbox.unwrap();
        assert_eq!(bbox.min_lat, 48.8155755);
        assert_eq!(bbox.max_lon, 2.4697602);
    }

    #[test]
    fn test_empty_result_is_lookup_failure() {
        let err = parse_search_response("Atlantis", "[]").unwrap_err();
        assert!(matches!(err, Error::Lookup(ref q) if q == "Atlantis"));
    }

    #[test]
    fn test_malformed_response_is_lookup_failure() {
        assert!(matches!(
            parse_search_response("Paris", "{\"error\": \"Unable to geocode\"}"),
            Err(Error::Lookup(_))
        ));
    }

    #[test]
    fn test_bad_bbox_is_ignored() {
        let body = r#"[{"osm_type": "way", "osm_id": 1, "display_name": "X", "boundingbox": ["a"]}]"#;
        let place = parse_search_response("X", body).unwrap();
        assert!(place.bbox.is_none());
    }

    #[test]
    fn test_search_url_params() {
        let client = NominatimClient::new(&Config::default()).unwrap();
        let url = client.search_url("New York City", PlaceKind::County).unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("q=New+York+City"));
        assert!(query.contains("featuretype=county"));
        assert!(query.contains("limit=1"));
    }
}
