//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::execution: Budget-execution report (JSON, CSV export, HTMX page)

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use pucweb_config::Config;
use pucweb_core::ReportBook;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub book: Arc<RwLock<ReportBook>>,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::execution::{
        api_execution_export, api_execution_report, htmx_execution_rows, page_execution,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .route("/api/reports/execution", get(api_execution_report))
        .route("/api/reports/execution/export", get(api_execution_export))
        .route("/api/reload", post(api_reload))
        // HTMX page routes
        .route("/", get(index_page))
        .route("/reports/execution", get(page_execution))
        // HTMX partial routes
        .route("/reports/execution/rows", get(htmx_execution_rows))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Get data set summary (JSON API)
async fn api_summary(state: axum::extract::State<AppState>) -> String {
    let book = state.book.read().await;
    match book.summary() {
        Ok(summary) => serde_json::to_string(&summary).unwrap_or_default(),
        Err(e) => serde_json::to_string(&e.to_details()).unwrap_or_default(),
    }
}

/// Reload records API endpoint
async fn api_reload(state: axum::extract::State<AppState>) -> String {
    let book = state.book.write().await;
    match book.reload().await {
        Ok(_) => r#"{"success": true, "message": "Registros recargados"}"#.to_string(),
        Err(e) => format!(r#"{{"success": false, "message": "{}"}}"#, e),
    }
}

/// Index redirects to the single report screen
async fn index_page() -> axum::response::Redirect {
    axum::response::Redirect::to("/reports/execution")
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Pucweb</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [("/reports/execution", "Ejecución Presupuestal", "📊")];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Pucweb</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, icon) in &links {
        let is_active = current_path.starts_with(path);
        let active_class = if is_active {
            "bg-indigo-50 text-indigo-600"
        } else {
            "text-gray-600 hover:bg-gray-50"
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &axum::http::HeaderMap,
    title: &str,
    current_path: &str,
    inner_content: &str,
) -> String {
    if is_htmx_request(headers) {
        // HTMX partial - just the content area
        format!(
            r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#,
            inner_content
        )
    } else {
        // Full page - wrap with base HTML and sidebar
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path),
                inner_content
            ),
        )
    }
}

/// Start the HTTP server
///
/// Creates the router, binds to the configured address, and starts
/// listening for requests.
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `book` - The shared report book state
pub async fn start_server(config: Config, book: Arc<RwLock<ReportBook>>) {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { book, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.unwrap();
    eprintln!("[INFO] Starting Pucweb server on http://{}", addr);
    eprintln!("[INFO] Available routes:");
    eprintln!("[INFO]   - /reports/execution (Budget-execution report)");
    eprintln!("[INFO]   - /api/reports/execution (JSON report)");
    eprintln!("[INFO]   - /api/reports/execution/export (CSV export)");
    eprintln!("[INFO]   - /api/* (JSON API endpoints)");

    match axum::serve(listener, router).await {
        Ok(_) => eprintln!("[INFO] Server stopped gracefully"),
        Err(e) => eprintln!("[ERROR] Server error: {}", e),
    }
}
