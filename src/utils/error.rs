use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("PostgreSQL error: {0}")]
    PostgresError(#[from] sqlx::Error),

    #[error("MongoDB error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Persistence error: {message}")]
    PersistenceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Persistence,
    System,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::ConfigError { .. }
            | ServiceError::InvalidConfigValueError { .. }
            | ServiceError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ServiceError::PostgresError(_)
            | ServiceError::MongoError(_)
            | ServiceError::PersistenceError { .. } => ErrorCategory::Persistence,
            ServiceError::IoError(_) => ErrorCategory::System,
            ServiceError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 資料庫暫時不可用，可重試
            ServiceError::PostgresError(_)
            | ServiceError::MongoError(_)
            | ServiceError::PersistenceError { .. } => ErrorSeverity::Medium,
            ServiceError::SerializationError(_) => ErrorSeverity::Medium,
            ServiceError::ConfigError { .. }
            | ServiceError::InvalidConfigValueError { .. }
            | ServiceError::MissingConfigError { .. } => ErrorSeverity::High,
            ServiceError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ServiceError::IoError(_) => {
                "Check that the log directory is writable and the listen port is free".to_string()
            }
            ServiceError::SerializationError(_) => {
                "Stored operation arguments are not valid JSON; inspect the affected rows".to_string()
            }
            ServiceError::PostgresError(_) => {
                "Verify the PostgreSQL URL and that the database is reachable".to_string()
            }
            ServiceError::MongoError(_) => {
                "Verify the MongoDB URL and that the server is reachable".to_string()
            }
            ServiceError::ConfigError { .. } => {
                "Review the configuration file and command line flags".to_string()
            }
            ServiceError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}'", field)
            }
            ServiceError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            ServiceError::PersistenceError { .. } => {
                "Check the persistence backends; the service keeps running without them".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Persistence => format!("Database problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
            ErrorCategory::Data => format!("Data problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = ServiceError::MissingConfigError {
            field: "postgres.url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.recovery_suggestion().contains("postgres.url"));
    }

    #[test]
    fn test_user_friendly_message_mentions_category() {
        let err = ServiceError::PersistenceError {
            message: "no backend".to_string(),
        };
        assert!(err.user_friendly_message().starts_with("Database problem"));
    }
}
