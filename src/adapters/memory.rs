use crate::domain::model::{Flavor, NewOperation, OperationRecord};
use crate::domain::ports::OperationStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-local store, used when running without databases and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<OperationRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl OperationStore for MemoryStore {
    fn name(&self) -> &'static str {
        "Memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    async fn append(&self, op: &NewOperation) -> Result<OperationRecord> {
        let mut records = self.records.lock().await;
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        let record = OperationRecord::from_new(next_id, op);
        records.push(record.clone());
        Ok(record)
    }

    async fn insert(&self, record: &OperationRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn history(&self, flavor: Option<Flavor>) -> Result<Vec<OperationRecord>> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| flavor.map_or(true, |f| r.flavor == f.as_str()))
            .cloned()
            .collect())
    }
}
