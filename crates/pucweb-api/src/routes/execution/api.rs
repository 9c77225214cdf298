//! Budget-execution API endpoints - JSON API, CSV export and HTMX partials
//!
//! Endpoints:
//! - api_execution_report: Aggregated report rows and totals (JSON)
//! - api_execution_export: Flattened report rows (CSV)
//! - htmx_execution_rows: Report table body (HTML fragment)

use crate::AppState;
use axum::extract::Query;
use axum::http::header;
use std::collections::HashMap;

/// Get the aggregated (optionally filtered) execution report (JSON API)
pub async fn api_execution_report(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> String {
    let book = state.book.read().await;
    let term = params.get("term").map(|s| s.as_str()).unwrap_or("");

    match book.execution_report(term) {
        Ok(report) => serde_json::to_string(&report).unwrap_or_default(),
        Err(e) => {
            log::warn!(target: "pucweb::api", "execution report failed: {}", e);
            serde_json::to_string(&e.to_details()).unwrap_or_default()
        }
    }
}

/// Export the flattened report rows as CSV
pub async fn api_execution_export(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> axum::response::Response {
    use axum::response::IntoResponse;

    let book = state.book.read().await;
    let term = params.get("term").map(|s| s.as_str()).unwrap_or("");

    match book.execution_report(term) {
        Ok(report) => {
            let mut csv = String::from("codigo,nombre,nivel,presupuestado,ejecutado,variacion,cumplimiento\n");
            for row in &report.rows {
                csv.push_str(&format!(
                    "{},{},{},{:.2},{:.2},{:.2},{:.2}\n",
                    row.code,
                    csv_escape(&row.name),
                    row.level,
                    row.budgeted,
                    row.executed,
                    row.variance,
                    row.compliance_ratio
                ));
            }
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"ejecucion_presupuestal.csv\"",
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => (
            axum::http::StatusCode::CONFLICT,
            serde_json::to_string(&e.to_details()).unwrap_or_default(),
        )
            .into_response(),
    }
}

/// Quote a CSV field when it contains separators or quotes
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// HTMX: report table body driven by the search box
pub async fn htmx_execution_rows(
    state: axum::extract::State<AppState>,
    params: Query<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let book = state.book.read().await;
    let term = params.get("term").map(|s| s.as_str()).unwrap_or("");
    axum::response::Html(super::page::render_execution_rows(&book, &state.config, term))
}

// ==================== Tests ====================
