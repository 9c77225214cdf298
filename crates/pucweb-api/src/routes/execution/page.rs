//! Budget-execution page rendering

use crate::{page_response, AppState};
use axum::extract::Query;
use pucweb_config::Config;
use pucweb_core::ReportBook;
use pucweb_utils::{format_amount, format_percent};
use std::collections::HashMap;

/// Full report page: search box, export link and the report table
pub async fn page_execution(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let book = state.book.read().await;
    let term = params.get("term").map(|s| s.as_str()).unwrap_or("");

    let inner_content = format!(
        r#"<div class='mb-6 flex items-center justify-between'>
            <h2 class='text-2xl font-bold'>Ejecución Presupuestal</h2>
            <a href='/api/reports/execution/export?term={term_enc}'
               class='px-3 py-2 bg-indigo-600 text-white text-sm rounded-lg hover:bg-indigo-700'>Exportar CSV</a>
        </div>
        <div class='mb-4'>
            <input type='search' name='term' value='{term_attr}' placeholder='Buscar por código o nombre...'
                   class='w-full px-3 py-2 border rounded-lg'
                   hx-get='/reports/execution/rows'
                   hx-trigger='keyup changed delay:300ms, search'
                   hx-target='#execution-rows'
                   hx-swap='innerHTML'>
        </div>
        <div class='bg-white rounded-xl shadow-sm overflow-hidden'>
            <table class='w-full text-sm'>
                <thead class='bg-gray-100 text-left'>
                    <tr>
                        <th class='px-4 py-2'>Código</th>
                        <th class='px-4 py-2'>Nombre</th>
                        <th class='px-4 py-2 text-right'>Presupuestado</th>
                        <th class='px-4 py-2 text-right'>Ejecutado</th>
                        <th class='px-4 py-2 text-right'>Variación</th>
                        <th class='px-4 py-2 text-right'>Cumplimiento</th>
                    </tr>
                </thead>
                <tbody id='execution-rows'>{rows}</tbody>
            </table>
        </div>"#,
        term_enc = urlencoding::encode(term),
        term_attr = html_escape(term),
        rows = render_execution_rows(&book, &state.config, term),
    );

    axum::response::Html(page_response(
        &headers,
        "Ejecución Presupuestal",
        "/reports/execution",
        &inner_content,
    ))
}

/// Render the report table body (shared by the page and the HTMX partial)
pub fn render_execution_rows(book: &ReportBook, config: &Config, term: &str) -> String {
    let currency = &config.currency;
    let money = |value: f64| {
        format_amount(
            value,
            currency.decimal_places,
            &currency.thousands_separator,
            &currency.decimal_separator,
        )
    };

    let report = match book.execution_report(term) {
        Ok(report) => report,
        Err(e) => {
            return format!(
                "<tr><td colspan='6' class='px-4 py-6 text-center text-gray-500'>{}</td></tr>",
                html_escape(&e.to_string())
            );
        }
    };

    if report.rows.len() <= 1 {
        return "<tr><td colspan='6' class='px-4 py-6 text-center text-gray-500'>Sin resultados</td></tr>".to_string();
    }

    let mut html = String::new();
    let (detail_rows, totals_row) = report.rows.split_at(report.rows.len() - 1);

    for row in detail_rows {
        let indent = row.level * 16;
        let name_class = if row.level == 0 { "font-semibold" } else { "" };
        let variance_class = if row.variance < 0.0 { "text-red-600" } else { "text-green-700" };
        html.push_str(&format!(
            r#"<tr class='border-t hover:bg-gray-50'>
                <td class='px-4 py-2 font-mono'>{}</td>
                <td class='px-4 py-2 {}' style='padding-left: {}px'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-right {}'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
            </tr>"#,
            row.code,
            name_class,
            16 + indent,
            html_escape(&row.name),
            money(row.budgeted),
            money(row.executed),
            variance_class,
            money(row.variance),
            format_percent(row.compliance_ratio),
        ));
    }

    for total in totals_row {
        html.push_str(&format!(
            r#"<tr class='border-t bg-gray-100 font-bold'>
                <td class='px-4 py-2'></td>
                <td class='px-4 py-2'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
                <td class='px-4 py-2 text-right'>{}</td>
            </tr>"#,
            html_escape(&total.name),
            money(total.budgeted),
            money(total.executed),
            money(total.variance),
            format_percent(total.compliance_ratio),
        ));
    }

    html
}

/// Minimal HTML escaping for text content and attribute values
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ==================== Tests ====================
