use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flavor {
    Stack,
    Independent,
}

impl Flavor {
    pub fn as_str(self) -> &'static str {
        match self {
            Flavor::Stack => "STACK",
            Flavor::Independent => "INDEPENDENT",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STACK" => Ok(Flavor::Stack),
            "INDEPENDENT" => Ok(Flavor::Independent),
            other => Err(format!("unknown flavor: {}", other)),
        }
    }
}

/// One successful calculation as kept in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub flavor: Flavor,
    pub operation: String,
    pub arguments: Vec<i64>,
    pub result: i64,
}

/// A calculation waiting for an id from the primary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOperation {
    pub flavor: Flavor,
    pub operation: String,
    pub result: i64,
    pub arguments: Vec<i64>,
}

impl From<&HistoryEntry> for NewOperation {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            flavor: entry.flavor,
            operation: entry.operation.clone(),
            result: entry.result,
            arguments: entry.arguments.clone(),
        }
    }
}

/// A persisted calculation, shaped as the history endpoint returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub id: i64,
    pub flavor: String,
    pub operation: String,
    pub result: i64,
    pub arguments: Vec<i64>,
}

impl OperationRecord {
    pub fn from_new(id: i64, op: &NewOperation) -> Self {
        Self {
            id,
            flavor: op.flavor.as_str().to_string(),
            operation: op.operation.clone(),
            result: op.result,
            arguments: op.arguments.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMethod {
    Postgres,
    Mongo,
}

impl FromStr for PersistenceMethod {
    type Err = String;

    // 與資料庫欄位一致，只接受大寫
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POSTGRES" => Ok(PersistenceMethod::Postgres),
            "MONGO" => Ok(PersistenceMethod::Mongo),
            other => Err(format!("unknown persistence method: {}", other)),
        }
    }
}

impl fmt::Display for PersistenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceMethod::Postgres => f.write_str("POSTGRES"),
            PersistenceMethod::Mongo => f.write_str("MONGO"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_parsing_is_case_insensitive() {
        assert_eq!("stack".parse::<Flavor>(), Ok(Flavor::Stack));
        assert_eq!("Independent".parse::<Flavor>(), Ok(Flavor::Independent));
        assert!("queue".parse::<Flavor>().is_err());
    }

    #[test]
    fn test_persistence_method_requires_upper_case() {
        assert_eq!("POSTGRES".parse::<PersistenceMethod>(), Ok(PersistenceMethod::Postgres));
        assert_eq!("MONGO".parse::<PersistenceMethod>(), Ok(PersistenceMethod::Mongo));
        assert!("mongo".parse::<PersistenceMethod>().is_err());
    }

    #[test]
    fn test_history_entry_serializes_flavor_upper_case() {
        let entry = HistoryEntry {
            flavor: Flavor::Stack,
            operation: "Plus".to_string(),
            arguments: vec![2, 3],
            result: 5,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"flavor": "STACK", "operation": "Plus", "arguments": [2, 3], "result": 5})
        );
    }
}
