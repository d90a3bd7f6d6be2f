use crate::domain::model::{Flavor, NewOperation, OperationRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Backend name used in logs ("Postgres", "Mongo", ...).
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    /// Creates tables or indexes the store needs. Must be idempotent.
    async fn prepare(&self) -> Result<()>;

    /// Allocates the next id (max + 1, starting at 1) and stores the operation.
    async fn append(&self, op: &NewOperation) -> Result<OperationRecord>;

    /// Stores a record under an id allocated elsewhere.
    async fn insert(&self, record: &OperationRecord) -> Result<()>;

    async fn history(&self, flavor: Option<Flavor>) -> Result<Vec<OperationRecord>>;
}
