use crate::domain::model::{Flavor, NewOperation, OperationRecord, PersistenceMethod};
use crate::domain::ports::OperationStore;
use std::sync::Arc;
use std::time::Duration;

/// Writes every successful calculation to the primary store (which owns id
/// allocation) and mirrors it, under the same id, into the replica.
///
/// Failures are logged and swallowed: persistence never changes the outcome
/// of a calculation request.
#[derive(Clone)]
pub struct OperationArchive {
    primary: Arc<dyn OperationStore>,
    replica: Arc<dyn OperationStore>,
}

impl OperationArchive {
    pub fn new(primary: Arc<dyn OperationStore>, replica: Arc<dyn OperationStore>) -> Self {
        Self { primary, replica }
    }

    /// Returns the stored record, or `None` when the primary write failed.
    pub async fn record(&self, op: NewOperation) -> Option<OperationRecord> {
        let record = match self.primary.append(&op).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("❌ Error saving to {}: {}", self.primary.name(), e);
                return None;
            }
        };

        if let Err(e) = self.replica.insert(&record).await {
            tracing::error!("❌ Error saving to {}: {}", self.replica.name(), e);
        }
        Some(record)
    }

    /// `POSTGRES` reads the primary, `MONGO` the replica. Read failures yield
    /// an empty list.
    pub async fn history(
        &self,
        method: PersistenceMethod,
        flavor: Option<Flavor>,
    ) -> Vec<OperationRecord> {
        let store = match method {
            PersistenceMethod::Postgres => &self.primary,
            PersistenceMethod::Mongo => &self.replica,
        };
        match store.history(flavor).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("❌ Error reading {}: {}", store.name(), e);
                Vec::new()
            }
        }
    }
}

/// Pings `store` up to `attempts` times, `delay` apart, then prepares its
/// schema. Returns whether the store became ready; never fails startup.
pub async fn wait_until_ready(store: &dyn OperationStore, attempts: usize, delay: Duration) -> bool {
    for attempt in 1..=attempts {
        match store.ping().await {
            Ok(()) => match store.prepare().await {
                Ok(()) => {
                    tracing::info!("✅ {} is ready.", store.name());
                    return true;
                }
                Err(e) => tracing::warn!("Waiting for {}... ({})", store.name(), e),
            },
            Err(e) => tracing::warn!("Waiting for {}... ({})", store.name(), e),
        }
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::error!("❌ ERROR: Could not connect to {}.", store.name());
    false
}
