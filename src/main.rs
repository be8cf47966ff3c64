//! hostwatch — LAN Server Monitoring Dashboard
//!
//! A single-binary dashboard that:
//! - Scans the local network for reachable servers and tracks a selection
//! - Monitors system health (CPU, RAM, disk, temperature, GPU, network)
//! - Serves everything as JSON for the browser dashboard to poll

use actix_web::{App, HttpServer, web};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

use hostwatch::{api, config, discovery, monitoring, registry};

/// hostwatch — LAN server monitoring dashboard
#[derive(Parser)]
#[command(name = "hostwatch", version, about = "LAN server monitoring dashboard")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Path to the persisted dashboard config
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hostwatch=info".parse().unwrap())
                .add_directive("actix_web=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    info!("");
    info!("  hostwatch v{}", env!("CARGO_PKG_VERSION"));
    info!("  ──────────────────────────────────");
    info!("  Hostname:   {}", hostname);
    info!("  Dashboard:  http://{}:{}", cli.bind, cli.port);
    info!("");

    let registry = Arc::new(registry::ServerRegistry::from_config(
        config::load(&cli.config),
        cli.config.clone(),
    ));

    // Initial network scan runs in the background; requests are served
    // while it is still sweeping
    info!("Starting initial network scan...");
    tokio::spawn(discovery::run_scan(registry.clone()));

    let app_state = web::Data::new(api::AppState {
        monitor: Mutex::new(monitoring::SystemMonitor::new()),
        registry: registry.clone(),
    });

    let web_dir = find_web_dir();
    info!("  Serving web UI from: {}", web_dir);
    info!("");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(api::configure)
            .service(actix_files::Files::new("/", &web_dir).index_file("index.html"))
    })
    .bind(format!("{}:{}", cli.bind, cli.port))?
    .run()
    .await
}

/// Find the web directory — check multiple locations
fn find_web_dir() -> String {
    let candidates = [
        // Development
        "web",
        // Installed
        "/opt/hostwatch/web",
        "/usr/share/hostwatch/web",
    ];

    for dir in &candidates {
        let path = std::path::Path::new(dir);
        if path.exists() && path.join("index.html").exists() {
            return dir.to_string();
        }
    }

    // Fallback
    "web".to_string()
}
