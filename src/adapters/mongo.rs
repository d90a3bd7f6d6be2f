use crate::domain::model::{Flavor, NewOperation, OperationRecord};
use crate::domain::ports::OperationStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Document layout shared with the Postgres `operations` table; `arguments`
/// holds the JSON-encoded argument list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OperationDocument {
    rawid: i64,
    flavor: String,
    operation: String,
    result: i64,
    #[serde(default = "empty_arguments")]
    arguments: String,
}

fn empty_arguments() -> String {
    "[]".to_string()
}

impl OperationDocument {
    fn from_record(record: &OperationRecord) -> Result<Self> {
        Ok(Self {
            rawid: record.id,
            flavor: record.flavor.clone(),
            operation: record.operation.clone(),
            result: record.result,
            arguments: serde_json::to_string(&record.arguments)?,
        })
    }

    fn into_record(self) -> Result<OperationRecord> {
        Ok(OperationRecord {
            id: self.rawid,
            flavor: self.flavor,
            operation: self.operation,
            result: self.result,
            arguments: serde_json::from_str(&self.arguments)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    collection: Collection<OperationDocument>,
}

impl MongoStore {
    /// Parses the URL and builds the client; no server round-trip happens here.
    pub async fn connect(
        url: &str,
        database: &str,
        collection: &str,
        server_selection_timeout: Duration,
    ) -> Result<Self> {
        let mut options = ClientOptions::parse(url).await?;
        options.server_selection_timeout = Some(server_selection_timeout);
        let client = Client::with_options(options)?;
        let collection = client
            .database(database)
            .collection::<OperationDocument>(collection);
        Ok(Self { client, collection })
    }

    fn flavor_filter(flavor: Option<Flavor>) -> Document {
        match flavor {
            Some(flavor) => doc! { "flavor": flavor.as_str() },
            None => doc! {},
        }
    }
}

#[async_trait]
impl OperationStore for MongoStore {
    fn name(&self) -> &'static str {
        "Mongo"
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn prepare(&self) -> Result<()> {
        let index = IndexModel::builder().keys(doc! { "rawid": 1 }).build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    async fn append(&self, op: &NewOperation) -> Result<OperationRecord> {
        let latest = self
            .collection
            .find_one(doc! {})
            .sort(doc! { "rawid": -1 })
            .await?;
        let next_id = latest.map_or(1, |document| document.rawid + 1);
        let record = OperationRecord::from_new(next_id, op);
        self.insert(&record).await?;
        Ok(record)
    }

    async fn insert(&self, record: &OperationRecord) -> Result<()> {
        let document = OperationDocument::from_record(record)?;
        self.collection.insert_one(&document).await?;
        tracing::debug!("Saved operation #{} to Mongo", record.id);
        Ok(())
    }

    async fn history(&self, flavor: Option<Flavor>) -> Result<Vec<OperationRecord>> {
        let cursor = self
            .collection
            .find(Self::flavor_filter(flavor))
            .sort(doc! { "rawid": 1 })
            .await?;
        let documents: Vec<OperationDocument> = cursor.try_collect().await?;
        documents
            .into_iter()
            .map(OperationDocument::into_record)
            .collect()
    }
}
