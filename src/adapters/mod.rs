// Adapters layer: concrete persistence backends and the dual-write archive.

pub mod archive;
pub mod memory;
pub mod mongo;
pub mod postgres;

pub use archive::{wait_until_ready, OperationArchive};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use postgres::PostgresStore;
