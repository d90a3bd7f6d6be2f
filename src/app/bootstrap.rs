use crate::adapters::{wait_until_ready, MemoryStore, MongoStore, OperationArchive, PostgresStore};
use crate::app::server;
use crate::app::state::AppState;
use crate::config::Settings;
use crate::utils::error::Result;
use crate::utils::logger::LogLevels;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builds the persistence archive described by `settings` and waits for its
/// backends. Unreachable databases are logged, not fatal.
pub async fn build_archive(settings: &Settings) -> Result<OperationArchive> {
    if settings.memory_store {
        tracing::info!("🗄️ Using in-memory operation stores");
        return Ok(OperationArchive::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        ));
    }

    tracing::info!("Initializing Databases...");
    let postgres = PostgresStore::connect_lazy(&settings.postgres_url)?;
    let mongo = MongoStore::connect(
        &settings.mongo_url,
        &settings.mongo_database,
        &settings.mongo_collection,
        settings.mongo_server_selection_timeout,
    )
    .await?;

    wait_until_ready(&postgres, settings.db_connect_attempts, settings.db_retry_delay).await;
    wait_until_ready(&mongo, settings.db_connect_attempts, settings.db_retry_delay).await;

    Ok(OperationArchive::new(Arc::new(postgres), Arc::new(mongo)))
}

/// Full service lifecycle: persistence, bind, serve until `shutdown`.
pub async fn run<F>(settings: &Settings, log_levels: LogLevels, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let archive = build_archive(settings).await?;
    let listener = TcpListener::bind(settings.bind_address()?).await?;
    server::serve(listener, AppState::new(archive, log_levels), shutdown).await
}
