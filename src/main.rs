//! Equipment scanner console
//!
//! Resolves equipment codes typed (or sent by a keyboard-wedge scanner) on
//! stdin against the equipment API.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equipment_scanner::{
    config::{AppConfig, LoggingConfig},
    media::HeadlessMedia,
    models::{ScanEvent, ScanResult},
    repository::Repository,
    services::Services,
    AppState, ScanError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    tracing::info!("Starting equipment scanner v{}", env!("CARGO_PKG_VERSION"));

    let repository = Repository::new(&config.api)?;
    let media = Arc::new(HeadlessMedia);
    let services = Services::new(repository, media.clone(), media, config.scanner.clone());

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    tracing::info!("Equipment API at {}", state.config.api.equipment_url());

    let session = state.services.scanner.open_session();
    let mut events = session.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ScanEvent::NotFound { code } => println!("No equipment with code {}", code),
                ScanEvent::Error(e) => eprintln!("{} ({})", e, e.code()),
                ScanEvent::StateChanged(state) => tracing::debug!(%state, "Session state"),
                ScanEvent::EquipmentFound(_) => {}
            }
        }
    });

    println!("Type an equipment code and press enter (Ctrl-D to quit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match session.submit_manual(&line).await {
            Ok(ScanResult::EquipmentFound(record)) => {
                println!(
                    "{} | {} | status: {} | location: {}",
                    record.item_code,
                    record.name,
                    record.status,
                    record.location.as_deref().unwrap_or("-"),
                );
                if !record.is_borrowable() {
                    println!("This item cannot be borrowed right now.");
                }
                break;
            }
            Ok(_) => {}
            Err(ScanError::EmptyCode) => continue,
            Err(ScanError::SessionClosed) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    session.close().await;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("equipment_scanner={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
