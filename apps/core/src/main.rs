// MailTriage V1 Backend Entry Point
// Classifies incoming email into productive/unproductive and suggests replies.

mod api;
mod brain;
mod classifier;
mod config;
mod error;
mod extract;
mod models;
mod remote;
mod storage;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::classifier::EmailClassifier;
use crate::config::Settings;
use crate::remote::RemoteClassifier;
use crate::storage::AnalysisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    info!("Starting {} v{}", settings.app_name, settings.app_version);

    // Fail fast on a broken keyword table rather than misclassifying quietly.
    brain::validate_lexicon().map_err(error::AppError::Config)?;

    let remote = RemoteClassifier::from_settings(&settings);
    let classifier = EmailClassifier::new(remote, settings.use_openai);

    let state = Arc::new(AppState {
        classifier,
        store: AnalysisStore::new(),
        settings: settings.clone(),
    });

    let app = api::router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
