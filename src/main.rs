pub mod types;
pub mod config;
pub mod error;
pub mod data;
pub mod cache;
pub mod vocabulary;
pub mod filter;
pub mod map;
pub mod html;
pub mod render;
pub mod responder;
pub mod session;
pub mod server;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

use crate::cache::{Snapshot, TableCache};
use crate::filter::{filter_points, FilterCriteria, MunicipalityChoice};
use crate::types::FocusPoint;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,
    /// Data file to read instead of the one named in the config
    #[arg(short, long, value_name = "FILE")]
    data: Option<PathBuf>,
}

#[derive(Args)]
struct Filters {
    /// Comuna to show ("Todas" for every one)
    #[arg(long, default_value = vocabulary::ALL_MUNICIPALITIES)]
    comuna: String,
    /// Accepted material; repeat to match any of several
    #[arg(short, long = "material", value_name = "MATERIAL")]
    materials: Vec<String>,
}

impl Filters {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(MunicipalityChoice::parse(Some(self.comuna.as_str())), &self.materials)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the locator page and its API
    Serve {
        #[command(flatten)]
        source: Source,
    },
    /// Print the points matching the filters
    List {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        filters: Filters,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the comunas and materials available as filters
    Options {
        #[command(flatten)]
        source: Source,
    },
    /// Write the filtered points as a standalone HTML map
    Map {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        filters: Filters,
        #[arg(long, requires = "focus_lon", allow_hyphen_values = true)]
        focus_lat: Option<f64>,
        #[arg(long, requires = "focus_lat", allow_hyphen_values = true)]
        focus_lon: Option<f64>,
        #[arg(short, long, value_name = "FILE", default_value = "mapa.html")]
        out: PathBuf,
    },
    /// Ask GreenBot a recycling question
    Ask {
        text: Vec<String>,
    },
}

impl Source {
    fn config(&self) -> anyhow::Result<config::AppConfig> {
        let mut app_config = match &self.data {
            // a data file alone is enough to run with default settings
            Some(data) if !self.config.exists() => config::AppConfig::for_datafile(data.clone()),
            _ => config::AppConfig::load_from_file(&self.config)?,
        };
        if let Some(data) = &self.data {
            app_config.input.datafile = data.clone();
        }
        Ok(app_config)
    }
}

/// Loads the table, or `None` after warning that there is nothing to show.
fn load(app_config: &config::AppConfig) -> Option<Snapshot> {
    let cache = TableCache::new(app_config.cache.ttl());
    let sheet = app_config.input.sheet.as_deref();
    let snapshot = cache.get_with(&app_config.input.datafile, Instant::now(), |p| data::load_points(p, sheet));
    if snapshot.is_unavailable() {
        warn!("{}", render::UNAVAILABLE);
        eprintln!("{}", render::UNAVAILABLE);
        if let Some(failure) = &snapshot.failure {
            eprintln!("Error al cargar la base de datos: {}", failure);
        }
        return None;
    }
    Some(snapshot)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { source } => {
            let app_config = source.config()?;
            server::start_server(app_config).await?;
        }
        Commands::List { source, filters, json } => {
            let app_config = source.config()?;
            let Some(snapshot) = load(&app_config) else { std::process::exit(1) };

            let filtered = filter_points(&snapshot.points, &filters.criteria());
            let view = render::ListView::from_points(&filtered);
            if *json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", view.to_text());
            }
        }
        Commands::Options { source } => {
            let app_config = source.config()?;
            let Some(snapshot) = load(&app_config) else { std::process::exit(1) };

            println!("Comunas:");
            for municipality in vocabulary::municipalities(&snapshot.points) {
                println!("  {}", municipality);
            }
            println!("Materiales:");
            for material in vocabulary::extract_materials(&snapshot.points) {
                println!("  {}", vocabulary::title_case(&material));
            }
        }
        Commands::Map { source, filters, focus_lat, focus_lon, out } => {
            let app_config = source.config()?;
            let Some(snapshot) = load(&app_config) else { std::process::exit(1) };

            let filtered = filter_points(&snapshot.points, &filters.criteria());
            let focus = focus_lat.zip(*focus_lon).map(|(lat, lon)| FocusPoint { latitude: lat, longitude: lon });
            let view = map::build_map_view(&filtered, focus.as_ref(), &app_config.map.settings());
            render::write_map(&view, out)?;
            println!("Mapa con {} marcadores escrito en {:?}", view.markers.len(), out);
        }
        Commands::Ask { text } => {
            let reply = responder::respond(&text.join(" "));
            println!("{}", reply.text);
        }
    }

    Ok(())
}
