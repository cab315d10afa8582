//! Command-line front end.
//!
//! Looks a place up, generates its boundary or street GeoJSON and prints
//! statistics for generated or existing files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use placeshape::stats::{StatisticsCalculator, DEFAULT_TOP_N};
use placeshape::{Config, Error, Generator, Mode, PlaceKind, Session};

#[derive(Parser, Debug)]
#[command(name = "placeshape")]
#[command(about = "Generate GeoJSON boundaries and street networks for named places")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overpass interpreter URL (overrides config)
    #[arg(long, global = true)]
    overpass_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a place name and print its descriptor
    Lookup {
        /// Place name, e.g. "Paris"
        name: String,

        /// Place type hint: city, county, state or country
        #[arg(short, long, default_value = "city")]
        kind: PlaceKind,
    },

    /// Look a place up and write its GeoJSON
    Generate {
        name: String,

        #[arg(short, long, default_value = "city")]
        kind: PlaceKind,

        /// boundary or streets
        #[arg(short, long, default_value = "boundary")]
        mode: Mode,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Split street queries into a rows×cols grid over the place bounding box
        #[arg(long)]
        grid: Option<usize>,

        /// Print statistics after writing
        #[arg(long)]
        stats: bool,
    },

    /// Print statistics for an existing GeoJSON file
    Stats {
        file: PathBuf,

        /// Number of most common names to list
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = &args.overpass_url {
        config.overpass.url = url.clone();
    }

    match args.command {
        Command::Lookup { name, kind } => {
            let generator = Generator::new(&config)?;
            let place = generator.lookup(&name, kind).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&place)?);
        }
        Command::Generate {
            name,
            kind,
            mode,
            out,
            grid,
            stats,
        } => {
            if let Some(n) = grid {
                config.overpass.grid_rows = n;
                config.overpass.grid_cols = n;
            }
            config.validate()?;
            run_generate(&config, &name, kind, mode, &out, stats).await?;
        }
        Command::Stats { file, top } => {
            print_file_stats(&file, top)?;
        }
    }

    Ok(())
}

async fn run_generate(
    config: &Config,
    name: &str,
    kind: PlaceKind,
    mode: Mode,
    out: &Path,
    stats: bool,
) -> Result<()> {
    let generator = Generator::new(config)?;

    let place = generator.lookup(name, kind).await.map_err(report)?;
    info!("Location validated: {}", place.display_name);
    let session = Session::new().with_place(place.clone());

    let map = generator.generate(&place, mode).await.map_err(report)?;
    for warning in &map.warnings {
        warn!("{}", warning);
    }
    let session = session.with_result(map);

    let Some(map) = session.current.as_ref() else {
        anyhow::bail!("no result generated");
    };

    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;
    let path = map.write_to(out)?;
    println!("{}", path.display());

    if stats {
        println!(
            "{}",
            serde_json::to_string_pretty(&map.statistics(DEFAULT_TOP_N))?
        );
    }

    Ok(())
}

fn print_file_stats(file: &Path, top: usize) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let geojson: geojson::GeoJson = content.parse().context("Failed to parse GeoJSON")?;
    let collection = geojson::FeatureCollection::try_from(geojson)
        .context("GeoJSON is not a FeatureCollection")?;

    let stats = StatisticsCalculator::from_collection(&collection).summary(top);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Log the user-facing message (and raw payload for fetch failures) before bailing
fn report(err: Error) -> anyhow::Error {
    match &err {
        Error::Fetch {
            message,
            raw: Some(raw),
        } => error!("{}\nRaw response:\n{}", message, raw),
        other => error!("{}", other),
    }
    err.into()
}
