//! REST API for the hostwatch dashboard

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::discovery;
use crate::monitoring::{self, SystemMonitor};
use crate::registry::ServerRegistry;

/// Shared application state
pub struct AppState {
    pub monitor: Mutex<SystemMonitor>,
    pub registry: Arc<ServerRegistry>,
}

// ─── Server discovery API ───

/// GET /api/servers — servers found by the most recent scan
pub async fn get_servers(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.registry.list_servers())
}

/// POST /api/scan_servers — trigger an asynchronous network scan
pub async fn scan_servers(state: web::Data<AppState>) -> HttpResponse {
    info!("Network scan requested");
    tokio::spawn(discovery::run_scan(state.registry.clone()));
    HttpResponse::Ok().json(serde_json::json!({ "status": "scanning" }))
}

#[derive(Deserialize)]
pub struct SetServerRequest {
    pub ip: String,
}

/// POST /api/set_server — select the server to monitor
pub async fn set_server(
    state: web::Data<AppState>,
    body: web::Json<SetServerRequest>,
) -> HttpResponse {
    match state.registry.select(&body.ip) {
        Ok(record) => {
            info!("Monitoring target set to {} ({})", record.ip, record.hostname);
            HttpResponse::Ok().json(serde_json::json!({ "status": "success" }))
        }
        Err(e) => HttpResponse::Ok().json(serde_json::json!({
            "status": "error",
            "message": e.to_string(),
        })),
    }
}

/// GET /api/current_server — resolve the current selection; enqueues a
/// scan when nothing is selectable yet
pub async fn current_server(state: web::Data<AppState>) -> HttpResponse {
    let selection = state.registry.current_selection();
    if selection.scan_needed {
        info!("No server selectable yet, enqueueing a scan");
        tokio::spawn(discovery::run_scan(state.registry.clone()));
    }
    HttpResponse::Ok().json(serde_json::json!({
        "server": selection.server,
        "scan_enqueued": selection.scan_needed,
        "last_error": selection.last_error,
    }))
}

// ─── Metrics API ───

/// GET /api/system_info — host facts
pub async fn system_info(state: web::Data<AppState>) -> HttpResponse {
    let info = state.monitor.lock().unwrap().system_info();
    HttpResponse::Ok().json(info)
}

/// GET /api/resources — CPU, memory, and disk usage
pub async fn resources(state: web::Data<AppState>) -> HttpResponse {
    let resources = state.monitor.lock().unwrap().resources();
    HttpResponse::Ok().json(resources)
}

/// GET /api/processes — top processes by CPU
pub async fn processes(state: web::Data<AppState>) -> HttpResponse {
    let processes = state.monitor.lock().unwrap().processes();
    HttpResponse::Ok().json(processes)
}

/// GET /api/temperature — sensor readings
pub async fn temperature(state: web::Data<AppState>) -> HttpResponse {
    let temps = state.monitor.lock().unwrap().temperature();
    HttpResponse::Ok().json(temps)
}

/// GET /api/gpu — GPU device and driver
pub async fn gpu(_state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(monitoring::gpu_info())
}

/// GET /api/network — per-interface addresses and counters
pub async fn network(state: web::Data<AppState>) -> HttpResponse {
    let interfaces = state.monitor.lock().unwrap().network();
    HttpResponse::Ok().json(interfaces)
}

/// GET /api/all — aggregate of every metrics endpoint
pub async fn all_info(state: web::Data<AppState>) -> HttpResponse {
    let all = state.monitor.lock().unwrap().all();
    HttpResponse::Ok().json(all)
}

// ─── Settings API ───

/// GET /api/settings — theme and refresh interval for the dashboard shell
pub async fn get_settings(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "theme": state.registry.theme(),
        "refresh_interval": state.registry.refresh_interval(),
    }))
}

#[derive(Deserialize)]
pub struct SetThemeRequest {
    pub theme: String,
}

/// POST /api/set_theme — switch between light and dark, persisted
pub async fn set_theme(
    state: web::Data<AppState>,
    body: web::Json<SetThemeRequest>,
) -> HttpResponse {
    match body.theme.as_str() {
        "light" | "dark" => {
            state.registry.set_theme(&body.theme);
            HttpResponse::Ok().json(serde_json::json!({ "status": "success" }))
        }
        _ => HttpResponse::Ok().json(serde_json::json!({
            "status": "error",
            "message": format!("Unknown theme: {}", body.theme),
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Server discovery
        .route("/api/servers", web::get().to(get_servers))
        .route("/api/scan_servers", web::post().to(scan_servers))
        .route("/api/set_server", web::post().to(set_server))
        .route("/api/current_server", web::get().to(current_server))
        // Metrics
        .route("/api/system_info", web::get().to(system_info))
        .route("/api/resources", web::get().to(resources))
        .route("/api/processes", web::get().to(processes))
        .route("/api/temperature", web::get().to(temperature))
        .route("/api/gpu", web::get().to(gpu))
        .route("/api/network", web::get().to(network))
        .route("/api/all", web::get().to(all_info))
        // Settings
        .route("/api/settings", web::get().to(get_settings))
        .route("/api/set_theme", web::post().to(set_theme));
}
