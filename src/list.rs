// Pure task list state and its transitions

use crate::models::{Priority, Task, TaskId};
use std::collections::HashSet;

/// A state change requested against a [`TaskList`]
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add {
        text: String,
        priority: Priority,
        created_at: String,
    },
    Delete(TaskId),
    ToggleComplete(TaskId),
    TogglePriority(TaskId),
    ReplaceAll(Vec<Task>),
    Clear,
}

/// Ordered, id-unique list of tasks
///
/// Insertion order is creation order. Ids come from a counter owned by the
/// list that only moves forward, so a deleted id is never handed out again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Id the next added task will receive
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Apply `action`, returning the new state, or `None` when it is a no-op
    ///
    /// No-ops: blank text on add, an add once the id counter is used up,
    /// an unknown id, a replacement list with repeated ids or holding
    /// `u64::MAX`, clearing an empty list.
    pub fn apply(&self, action: &Action) -> Option<TaskList> {
        match action {
            Action::Add {
                text,
                priority,
                created_at,
            } => self.with_added(text, *priority, created_at),
            Action::Delete(id) => {
                self.position(*id)?;
                Some(TaskList {
                    tasks: self.tasks.iter().filter(|t| t.id != *id).cloned().collect(),
                    next_id: self.next_id,
                })
            }
            Action::ToggleComplete(id) => self.with_task_updated(*id, |t| t.completed = !t.completed),
            Action::TogglePriority(id) => self.with_task_updated(*id, |t| t.priority = t.priority.toggled()),
            Action::ReplaceAll(tasks) => self.with_replaced(tasks),
            Action::Clear => {
                if self.tasks.is_empty() {
                    return None;
                }
                Some(TaskList {
                    tasks: Vec::new(),
                    next_id: self.next_id,
                })
            }
        }
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn with_added(&self, text: &str, priority: Priority, created_at: &str) -> Option<TaskList> {
        if text.trim().is_empty() {
            return None;
        }

        // Counter exhausted; handing out next_id again would repeat an id
        let next_id = self.next_id.checked_add(1)?;

        let mut tasks = self.tasks.clone();
        tasks.push(Task::new(self.next_id, text, priority, created_at));

        Some(TaskList { tasks, next_id })
    }

    fn with_task_updated(&self, id: TaskId, update: impl FnOnce(&mut Task)) -> Option<TaskList> {
        let index = self.position(id)?;

        let mut tasks = self.tasks.clone();
        update(&mut tasks[index]);

        Some(TaskList {
            tasks,
            next_id: self.next_id,
        })
    }

    fn with_replaced(&self, tasks: &[Task]) -> Option<TaskList> {
        if !ids_unique(tasks) {
            return None;
        }

        // An id of u64::MAX leaves no room for the counter
        let max_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let after_max = max_id.checked_add(1)?;

        Some(TaskList {
            tasks: tasks.to_vec(),
            next_id: self.next_id.max(after_max),
        })
    }
}

/// True when no two tasks share an id
pub fn ids_unique(tasks: &[Task]) -> bool {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks.iter().all(|t| seen.insert(t.id))
}
