//! HTTP API for place lookup, GeoJSON generation and statistics.
//!
//! Handlers are stateless: every request does its own lookup and fetch, and
//! nothing is kept between requests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use placeshape::session::GEOJSON_MEDIA_TYPE;
use placeshape::stats::{Statistics, DEFAULT_TOP_N};
use placeshape::{Config, Generator, Mode, PlaceDescriptor, PlaceKind};

mod error;
use error::AppError;

#[derive(Parser, Debug)]
#[command(name = "placeshape-serve")]
#[command(about = "Placeshape HTTP API")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    generator: Generator,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    info!("Placeshape API");
    info!("Nominatim: {}", config.nominatim.url);
    info!("Overpass: {}", config.overpass.url);

    let state = Arc::new(AppState {
        generator: Generator::new(&config)?,
    });

    let app = router(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/lookup", get(lookup_handler))
        .route("/v1/generate", get(generate_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Deserialize)]
struct LookupParams {
    /// Place name
    q: String,
    /// Place type hint (defaults to city)
    #[serde(default)]
    kind: PlaceKind,
}

#[derive(Deserialize)]
struct GenerateParams {
    q: String,
    #[serde(default)]
    kind: PlaceKind,
    mode: Mode,
}

async fn lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<PlaceDescriptor>, AppError> {
    let place = state.generator.lookup(&params.q, params.kind).await?;
    Ok(Json(place))
}

/// GeoJSON download for a place
async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Response, AppError> {
    let place = state.generator.lookup(&params.q, params.kind).await?;
    let map = state.generator.generate(&place, params.mode).await?;
    let body = map.to_geojson_string()?;

    Ok((
        [
            (header::CONTENT_TYPE, GEOJSON_MEDIA_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&map.download_name()),
            ),
        ],
        body,
    )
        .into_response())
}

#[derive(Serialize)]
struct StatsResponse {
    place: PlaceDescriptor,
    mode: Mode,
    dropped_elements: usize,
    statistics: Statistics,
}

async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> Result<Json<StatsResponse>, AppError> {
    let place = state.generator.lookup(&params.q, params.kind).await?;
    let map = state.generator.generate(&place, params.mode).await?;

    Ok(Json(StatsResponse {
        statistics: map.statistics(DEFAULT_TOP_N),
        dropped_elements: map.warnings.len(),
        place: map.place,
        mode: map.mode,
    }))
}

/// `attachment` header value; non-ASCII names go in the RFC 5987 `filename*` form
fn content_disposition(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| if c.is_ascii() && c != '"' && !c.is_ascii_control() { c } else { '_' })
        .collect();
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if is_attr_char(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii, encoded
    )
}

/// RFC 5987 `attr-char`
fn is_attr_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte)
}
