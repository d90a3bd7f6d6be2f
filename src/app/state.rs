use crate::adapters::OperationArchive;
use crate::core::Calculator;
use crate::utils::logger::LogLevels;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared by every handler. The calculator lock is never held across an
/// `.await`.
#[derive(Clone)]
pub struct AppState {
    calculator: Arc<Mutex<Calculator>>,
    pub archive: OperationArchive,
    pub log_levels: LogLevels,
    request_counter: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(archive: OperationArchive, log_levels: LogLevels) -> Self {
        Self {
            calculator: Arc::new(Mutex::new(Calculator::new())),
            archive,
            log_levels,
            request_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn calculator(&self) -> MutexGuard<'_, Calculator> {
        self.calculator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sequential request numbers, starting at 1.
    pub fn next_request_number(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}
