//! Command line entry point: reads a GTFS feed, searches paths and draws the network.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gtfs_network::layers::MapLayers;
use gtfs_network::map::{render_html, MapConfig};
use gtfs_network::{Gtfs, GtfsReader, Network, Stop};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gtfs-network")]
#[command(about = "Draws a transit network from a GTFS feed and finds paths between stops", long_about = None)]
struct Cli {
    /// GTFS feed: a directory, a zip archive or an url
    #[arg(long, env = "GTFS_PATH", global = true, default_value = "dmrc_gtfs")]
    gtfs: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PathArgs {
    /// Departure stop, by stop_id or name
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Arrival stop, by stop_id or name
    #[arg(long, requires = "from")]
    to: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of objects in the feed
    Stats,
    /// Print the path crossing the fewest stops between two stops
    Path {
        /// Departure stop, by stop_id or name
        from: String,
        /// Arrival stop, by stop_id or name
        to: String,
    },
    /// Write the lines, stations and optionally a path as GeoJSON
    Geojson {
        #[command(flatten)]
        path: PathArgs,

        /// Output file
        #[arg(short, long, default_value = "network.geojson")]
        output: PathBuf,
    },
    /// Write a standalone html map of the network
    Render {
        #[command(flatten)]
        path: PathArgs,

        /// Json map configuration (center, zoom, tiles, palette)
        #[arg(long, env = "MAP_CONFIG")]
        config: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "map.html")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats => {
            let gtfs = read_gtfs(&cli.gtfs, true)?;
            gtfs.print_stats();
            let network = Network::from_gtfs(&gtfs);
            println!("  Network: {} stops, {} edges", network.len(), network.edge_count());
        }
        Commands::Path { from, to } => {
            let gtfs = read_gtfs(&cli.gtfs, false)?;
            let path = search(&gtfs, &from, &to)?;
            for stop_id in &path {
                let name = gtfs.get_stop(stop_id).map(|s| s.name.as_str()).unwrap_or("");
                println!("{}\t{}", stop_id, name);
            }
            info!(stops = path.len(), "path printed");
        }
        Commands::Geojson { path, output } => {
            let gtfs = read_gtfs(&cli.gtfs, true)?;
            let found = path_from_args(&gtfs, &path)?;
            let palette = MapConfig::default().palette()?;
            let collection =
                MapLayers::build(&gtfs, &palette, found.as_deref()).into_feature_collection();
            std::fs::write(&output, serde_json::to_string_pretty(&collection)?)
                .with_context(|| format!("impossible to write {}", output.display()))?;
            info!(output = %output.display(), features = collection.features.len(), "geojson written");
        }
        Commands::Render {
            path,
            config,
            output,
        } => {
            let config = match config {
                Some(p) => MapConfig::from_path(&p)
                    .with_context(|| format!("impossible to load {}", p.display()))?,
                None => MapConfig::default(),
            };
            let gtfs = read_gtfs(&cli.gtfs, true)?;
            let found = path_from_args(&gtfs, &path)?;
            let collection = MapLayers::build(&gtfs, &config.palette()?, found.as_deref())
                .into_feature_collection();
            let html = render_html(&config, &collection)?;
            std::fs::write(&output, html)
                .with_context(|| format!("impossible to write {}", output.display()))?;
            info!(output = %output.display(), "map written");
        }
    }

    Ok(())
}

fn read_gtfs(source: &str, with_shapes: bool) -> Result<Gtfs> {
    let mut reader = GtfsReader::default();
    if !with_shapes {
        reader.without_shapes();
    }
    reader
        .read(source)
        .with_context(|| format!("impossible to read gtfs '{}'", source))
}

fn resolve<'a>(gtfs: &'a Gtfs, from: &str, to: &str) -> Result<(&'a Stop, &'a Stop)> {
    Ok((gtfs.find_stop(from)?, gtfs.find_stop(to)?))
}

fn search(gtfs: &Gtfs, from: &str, to: &str) -> Result<Vec<String>> {
    let (start, end) = resolve(gtfs, from, to)?;
    let network = Network::from_gtfs(gtfs);
    match network.shortest_path(&start.id, &end.id) {
        Some(path) => Ok(path),
        None => bail!("no path between {} ({}) and {} ({})", start, start.id, end, end.id),
    }
}

/// An unknown stop is an error, but a map is still drawn when the stops are not connected
fn path_from_args(gtfs: &Gtfs, args: &PathArgs) -> Result<Option<Vec<String>>> {
    let (from, to) = match (&args.from, &args.to) {
        (Some(from), Some(to)) => (from, to),
        _ => return Ok(None),
    };
    let (start, end) = resolve(gtfs, from, to)?;
    let path = Network::from_gtfs(gtfs).shortest_path(&start.id, &end.id);
    if path.is_none() {
        warn!(from = %start.id, to = %end.id, "no path, the map is drawn without it");
    }
    Ok(path)
}
