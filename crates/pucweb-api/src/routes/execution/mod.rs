//! Budget-execution report routes

pub mod api;
pub mod page;

pub use api::{api_execution_export, api_execution_report, htmx_execution_rows};
pub use page::page_execution;
