//! Pucweb main entry point

use clap::Parser;
use pucweb_api::start_server;
use pucweb_config::Config;
use pucweb_core::ReportBook;
use pucweb_source::JsonRecordSource;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "pucweb")]
#[command(author = "Pucweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight web interface for budget-execution reports", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let rt = Runtime::new()?;

    rt.block_on(async {
        let config = Config::load(args.config.clone())
            .expect("Failed to load configuration");

        eprintln!("[INFO] Config loaded: data path={}, main_file={}",
            config.data.path.to_string_lossy(), config.data.main_file);

        let source = Arc::new(JsonRecordSource::default());
        let book = Arc::new(RwLock::new(ReportBook::new(config.clone(), source)));

        // Try to load the records if the data file exists
        let records_path = config.records_path();
        eprintln!("[INFO] Looking for records file: {}", records_path.to_string_lossy());

        if records_path.exists() {
            eprintln!("[INFO] Records file found, loading...");
            let book_guard = book.read().await;
            match book_guard.load(records_path).await {
                Ok(_) => eprintln!("[INFO] Records loaded successfully"),
                Err(e) => eprintln!("[ERROR] Failed to load records: {:?}", e),
            }
        } else {
            eprintln!("[WARN] Records file not found: {}", records_path.display());
        }

        start_server(config, book).await
    });

    Ok(())
}
