use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use marathon_server::cache::{CacheConfig, CachedCatalog};
use marathon_server::catalog::FileCatalog;
use marathon_server::theaters::TheaterDirectory;
use marathon_server::web::{AppState, create_router};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_SHOWTIMES_DIR: &str = "data/showtimes";
const DEFAULT_THEATERS_FILE: &str = "data/theatre_list.json";
const DEFAULT_STATIC_DIR: &str = "static";

/// Server settings read from the environment.
struct ServerConfig {
    addr: SocketAddr,
    showtimes_dir: PathBuf,
    theaters_file: PathBuf,
    static_dir: String,
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());

        let addr_str = var("MARATHON_ADDR", DEFAULT_ADDR);
        let addr = addr_str
            .parse()
            .map_err(|e| format!("invalid MARATHON_ADDR {addr_str:?}: {e}"))?;

        Ok(Self {
            addr,
            showtimes_dir: var("MARATHON_SHOWTIMES_DIR", DEFAULT_SHOWTIMES_DIR).into(),
            theaters_file: var("MARATHON_THEATERS_FILE", DEFAULT_THEATERS_FILE).into(),
            static_dir: var("MARATHON_STATIC_DIR", DEFAULT_STATIC_DIR),
        })
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(message) = run().await {
        error!("{message}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env()?;

    // Fail fast if the directory is unusable
    let directory = TheaterDirectory::load(&config.theaters_file)
        .map_err(|e| format!("failed to load theaters: {e}"))?;
    info!(
        theaters = directory.len(),
        file = %config.theaters_file.display(),
        "loaded theater directory"
    );

    let catalog = CachedCatalog::new(
        FileCatalog::new(config.showtimes_dir.clone()),
        &CacheConfig::default(),
    );
    info!(dir = %config.showtimes_dir.display(), "reading showtimes");

    let state = AppState::new(catalog, directory);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.addr))?;

    info!("Marathon Planner listening on http://{}", config.addr);
    info!("  GET  /health                - Health check");
    info!("  GET  /api/theaters/search   - Find theaters");
    info!("  GET  /api/showtimes         - Browse a day's schedule");
    info!("  POST /itineraries/plan      - Plan a marathon");
    info!("  POST /itineraries/calendar  - Export an option as iCalendar");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}
