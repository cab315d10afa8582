//! Overpass API client with bounded, all-or-nothing fan-out.

use futures::{stream, StreamExt, TryStreamExt};
use hashbrown::HashSet;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{OsmType, OverpassResponse};

/// Fetches raw elements from an Overpass interpreter endpoint
pub struct OverpassClient {
    client: Client,
    url: String,
    max_concurrent: usize,
}

impl OverpassClient {
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
            url: config.overpass.url.clone(),
            max_concurrent: config.overpass.max_concurrent.max(1),
        })
    }

    /// Run one query. The query text is sent as the POST body.
    pub async fn fetch(&self, query: &str) -> Result<OverpassResponse> {
        debug!("Overpass query: {}", query);

        let response = self
            .client
            .post(&self.url)
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| Error::fetch(format!("Overpass request failed: {}", e), None))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("Failed to read Overpass response: {}", e), None))?;

        if !status.is_success() {
            warn!("Overpass query failed with status {}", status);
            return Err(Error::fetch(
                format!("Overpass returned status {}", status),
                Some(body),
            ));
        }

        parse_response(&body)
    }

    /// Run every query, at most `max_concurrent` at a time, and merge the results
    /// in query order.
    ///
    /// The first failing sub-query fails the whole call; sub-queries still in
    /// flight are dropped.
    pub async fn fetch_all(&self, queries: Vec<String>) -> Result<OverpassResponse> {
        let total = queries.len();
        info!(
            "Fetching {} Overpass queries ({} concurrent)",
            total, self.max_concurrent
        );

        let responses: Vec<OverpassResponse> = stream::iter(queries)
            .map(|query| async move { self.fetch(&query).await })
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        let merged = merge_responses(responses);
        info!(
            "Merged {} queries into {} elements",
            total,
            merged.elements.len()
        );
        Ok(merged)
    }
}

/// Parse an Overpass JSON body, keeping the raw text on failure
pub fn parse_response(body: &str) -> Result<OverpassResponse> {
    serde_json::from_str(body).map_err(|e| {
        Error::fetch(
            format!("Malformed Overpass response: {}", e),
            Some(body.to_string()),
        )
    })
}

/// Concatenate responses, keeping the first occurrence of each element.
///
/// Grid cells overlap on shared ways; a way crossing a cell edge comes back
/// from both neighbours.
pub fn merge_responses(responses: Vec<OverpassResponse>) -> OverpassResponse {
    let mut seen: HashSet<(OsmType, i64)> = HashSet::new();
    let mut elements = Vec::new();

    for response in responses {
        for element in response.elements {
            let key = match (element.osm_type(), element.id()) {
                (Some(t), Some(id)) => (t, id),
                _ => continue,
            };
            if seen.insert(key) {
                elements.push(element);
            }
        }
    }

    OverpassResponse { elements }
}
