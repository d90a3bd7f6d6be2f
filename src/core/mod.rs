pub mod calculator;

pub use crate::domain::model::{Flavor, HistoryEntry, NewOperation, OperationRecord};
pub use crate::domain::ports::OperationStore;
pub use crate::utils::error::Result;
pub use calculator::{CalcError, Calculator, StackOutcome};
