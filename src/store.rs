// Task store with write-through persistence to a key-value backend

use crate::filter::{self, FilterMode};
use crate::kv::KeyValueStore;
use crate::list::{Action, TaskList};
use crate::models::{DEFAULT_TIMESTAMP_FORMAT, Priority, Task, TaskId, timestamp_now, validate_timestamp_format};
use crate::record::Record;
use eyre::Result;
use tracing::{debug, info, warn};

/// Startup and runtime behavior of a [`Store`]
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Make the stored filter mode the active one on open
    pub restore_filter: bool,
    /// chrono format used for `createdAt`
    pub timestamp_format: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            restore_filter: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Owner of the task list and active filter mode
///
/// Every change is mirrored into the backing [`KeyValueStore`]. Read
/// failures at startup degrade to an empty list; write failures are logged
/// and the in-memory change stands.
pub struct Store<K: KeyValueStore> {
    kv: K,
    list: TaskList,
    filter: FilterMode,
    stored_filter: Option<FilterMode>,
    options: StoreOptions,
}

impl<K: KeyValueStore> Store<K> {
    /// Open a store over `kv` with default options
    pub fn open(kv: K) -> Self {
        Self::open_with(kv, StoreOptions::default())
    }

    /// Open a store over `kv`, hydrating from whatever it holds
    pub fn open_with(kv: K, mut options: StoreOptions) -> Self {
        if let Err(e) = validate_timestamp_format(&options.timestamp_format) {
            warn!(error = %e, "Falling back to default timestamp format");
            options.timestamp_format = DEFAULT_TIMESTAMP_FORMAT.to_string();
        }

        let mut store = Self {
            kv,
            list: TaskList::new(),
            filter: FilterMode::default(),
            stored_filter: None,
            options,
        };

        store.hydrate();
        store
    }

    fn hydrate(&mut self) {
        if let Some(list) = self.load::<TaskList>()
            && !list.is_empty()
        {
            info!(count = list.len(), "Loaded tasks from store");
            self.list = list;
        }

        self.stored_filter = self.load::<FilterMode>();
        if self.options.restore_filter
            && let Some(mode) = self.stored_filter
        {
            debug!(filter = %mode, "Restored filter mode");
            self.filter = mode;
        }
    }

    /// Read and decode a record; anything unreadable counts as absent
    fn load<R: Record>(&self) -> Option<R> {
        let key = R::storage_key();

        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = ?e, "Failed to read from store, treating as absent");
                return None;
            }
        };

        match R::decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = ?e, "Malformed stored value, treating as absent");
                None
            }
        }
    }

    fn save<R: Record>(kv: &mut K, value: &R) {
        let key = R::storage_key();
        if let Err(e) = Self::write(kv, key, value) {
            warn!(key, error = ?e, "Failed to persist change");
        }
    }

    fn write<R: Record>(kv: &mut K, key: &str, value: &R) -> Result<()> {
        let raw = value.encode()?;
        kv.set(key, &raw)
    }

    /// Apply `action`; persists and returns true when state changed
    pub fn dispatch(&mut self, action: Action) -> bool {
        match self.list.apply(&action) {
            Some(list) => {
                self.list = list;
                Self::save(&mut self.kv, &self.list);
                true
            }
            None => {
                debug!(?action, "No-op action");
                false
            }
        }
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Add a task; returns its id, or `None` when `text` is blank
    pub fn add(&mut self, text: &str, priority: Priority) -> Option<TaskId> {
        let id = self.list.next_id();
        let action = Action::Add {
            text: text.to_string(),
            priority,
            created_at: timestamp_now(&self.options.timestamp_format),
        };

        self.dispatch(action).then_some(id)
    }

    pub fn delete(&mut self, id: TaskId) -> bool {
        self.dispatch(Action::Delete(id))
    }

    pub fn toggle_complete(&mut self, id: TaskId) -> bool {
        self.dispatch(Action::ToggleComplete(id))
    }

    pub fn toggle_priority(&mut self, id: TaskId) -> bool {
        self.dispatch(Action::TogglePriority(id))
    }

    /// Replace the whole list; rejected when ids repeat
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> bool {
        self.dispatch(Action::ReplaceAll(tasks))
    }

    /// Remove every task
    pub fn clear(&mut self) -> bool {
        self.dispatch(Action::Clear)
    }

    // ========================================================================
    // Filter mode
    // ========================================================================

    /// Set the active filter mode, persisting it when it changes
    pub fn set_filter(&mut self, mode: FilterMode) {
        if self.filter == mode && self.stored_filter == Some(mode) {
            return;
        }

        self.filter = mode;
        self.stored_filter = Some(mode);
        Self::save(&mut self.kv, &mode);
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Filter mode found in the store at open time, or last written
    pub fn stored_filter(&self) -> Option<FilterMode> {
        self.stored_filter
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    /// Current immutable snapshot of the list
    pub fn snapshot(&self) -> &TaskList {
        &self.list
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.list.get(id)
    }

    /// Tasks as displayed under the active filter mode
    pub fn view(&self) -> Vec<&Task> {
        filter::view(self.list.tasks(), self.filter)
    }

    pub fn view_with(&self, mode: FilterMode) -> Vec<&Task> {
        filter::view(self.list.tasks(), mode)
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn into_kv(self) -> K {
        self.kv
    }
}
