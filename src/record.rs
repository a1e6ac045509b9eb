// Values mirrored into the key-value store under fixed keys

use crate::filter::FilterMode;
use crate::list::{Action, TaskList};
use crate::models::Task;
use eyre::{Context, Result, eyre};

/// Key holding the serialized task list
pub const TASKS_KEY: &str = "tasks";

/// Key holding the filter mode string
pub const FILTER_KEY: &str = "filterType";

/// Core trait for anything the persistence bridge stores
pub trait Record: Sized {
    /// Fixed key this value lives under
    fn storage_key() -> &'static str;

    /// Encode to the stored string form
    fn encode(&self) -> Result<String>;

    /// Decode from the stored string form
    fn decode(raw: &str) -> Result<Self>;
}

/// Stored as a JSON array of tasks; decoding goes through `ReplaceAll`
impl Record for TaskList {
    fn storage_key() -> &'static str {
        TASKS_KEY
    }

    fn encode(&self) -> Result<String> {
        serde_json::to_string(self.tasks()).context("Failed to serialize task list")
    }

    fn decode(raw: &str) -> Result<Self> {
        let tasks: Vec<Task> = serde_json::from_str(raw).context("Failed to parse stored task list")?;
        let count = tasks.len();
        TaskList::new()
            .apply(&Action::ReplaceAll(tasks))
            .ok_or_else(|| eyre!("Stored task list of {} tasks has repeated or out-of-range ids", count))
    }
}

/// Stored as the bare mode name, not as a JSON string
impl Record for FilterMode {
    fn storage_key() -> &'static str {
        FILTER_KEY
    }

    fn encode(&self) -> Result<String> {
        Ok(self.as_str().to_string())
    }

    fn decode(raw: &str) -> Result<Self> {
        Ok(FilterMode::from_stored(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn test_storage_keys() {
        assert_eq!(TaskList::storage_key(), "tasks");
        assert_eq!(FilterMode::storage_key(), "filterType");
    }

    #[test]
    fn test_task_list_encoding() {
        let tasks = vec![Task::new(1, "Buy milk", Priority::Low, "10/18/2026, 9:00:00 AM")];
        let list = TaskList::new().apply(&Action::ReplaceAll(tasks.clone())).unwrap();

        let raw = list.encode().unwrap();
        assert_eq!(
            raw,
            r#"[{"id":1,"text":"Buy milk","priority":"Low","completed":false,"createdAt":"10/18/2026, 9:00:00 AM"}]"#
        );
        let decoded = TaskList::decode(&raw).unwrap();
        assert_eq!(decoded.tasks(), tasks.as_slice());
        assert_eq!(decoded.next_id(), 2);
    }

    #[test]
    fn test_task_list_decode_rejects_malformed() {
        assert!(TaskList::decode("not json").is_err());
        assert!(TaskList::decode("null").is_err());
        assert!(TaskList::decode(r#"{"id":1}"#).is_err());
        assert!(TaskList::decode(r#"[{"id":1,"text":"x","priority":"Urgent","completed":false,"createdAt":"t"}]"#).is_err());
    }

    #[test]
    fn test_task_list_decode_rejects_bad_ids() {
        let dupes = r#"[{"id":1,"text":"a","priority":"Low","completed":false,"createdAt":"t"},
                        {"id":1,"text":"b","priority":"Low","completed":false,"createdAt":"t"}]"#;
        assert!(TaskList::decode(dupes).is_err());

        let max = r#"[{"id":18446744073709551615,"text":"a","priority":"Low","completed":false,"createdAt":"t"}]"#;
        assert!(TaskList::decode(max).is_err());
    }

    #[test]
    fn test_filter_mode_encoding_is_bare_string() {
        assert_eq!(FilterMode::Pending.encode().unwrap(), "Pending");
        assert_eq!(FilterMode::decode("Priority").unwrap(), FilterMode::Priority);
        assert_eq!(FilterMode::decode("\"Priority\"").unwrap(), FilterMode::All);
    }
}
