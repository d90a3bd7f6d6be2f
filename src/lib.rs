pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{MemoryStore, MongoStore, OperationArchive, PostgresStore};
pub use app::{build_router, AppState};
pub use config::Settings;
pub use crate::core::{CalcError, Calculator};
pub use utils::error::{Result, ServiceError};
