use datacat_core::Result;
use datacat_store::{to_document, Store, LOGS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER: &str = "admin";

/// One entry of the `logs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub user: String,
    pub action: String,
    pub perimeter: String,
    pub status: bool,
    pub message: String,
    pub date: String,
}

pub fn now() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Append an entry for an operation run by the default administrator.
pub fn record(store: &Store, action: &str, perimeter: &str, status: bool, message: &str) -> Result<()> {
    let entry = LogEntry {
        user: DEFAULT_USER.to_string(),
        action: action.to_string(),
        perimeter: perimeter.to_string(),
        status,
        message: message.to_string(),
        date: now(),
    };
    store.insert(LOGS, &to_document(LOGS, &entry)?)?;
    Ok(())
}
