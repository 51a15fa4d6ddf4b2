use std::sync::Arc;

use tokio::sync::mpsc;

use crate::app::create_app;
use crate::configs::Settings;
use crate::services::ScannerService;

pub mod app;
pub mod configs;
pub mod errors;
pub mod models;
pub mod services;

pub async fn run(settings: &Arc<Settings>) -> anyhow::Result<()> {
    let app = create_app(settings).await?;

    tracing::info!("relaying through {} backend", app.relay.backend_name());

    let devices = app.reconciler.reload().await;
    tracing::info!("{} devices configured", devices);

    let reconciler = app.reconciler.start();

    let (sender, receiver) = mpsc::unbounded_channel();
    let enricher = tokio::spawn(app.enricher.clone().run(receiver));

    match &settings.scanner {
        Some(scanner) => {
            tokio::spawn(ScannerService::new(scanner).run(sender));
        }
        None => {
            tracing::warn!("no scanner configured, only backfill will run");
            drop(sender);
        }
    }

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    reconciler.abort();
    enricher.abort();

    Ok(())
}
