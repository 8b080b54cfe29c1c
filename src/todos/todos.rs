use crate::error::StoreError;
use crate::memo::Memo;
use crate::store::{Store, Subscription};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high 3, medium 2, low 1.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(StoreError::InvalidPriority(other.to_string())),
        }
    }
}

/// Which slice of the list the view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(StoreError::InvalidFilter(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    /// Percentage of completed items, rounded; 0 for an empty list
    pub completion_rate: u32,
}

/// Items sharing one priority, in collection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityGroup {
    pub priority: Priority,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub filter: Filter,
    pub next_id: u64,
}

fn seed_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl Default for TodoState {
    fn default() -> Self {
        let seed = |id, text: &str, completed, priority, day| Todo {
            id,
            text: text.to_string(),
            completed,
            priority,
            created_at: seed_date(2024, 1, day),
        };
        Self {
            todos: vec![
                seed(1, "Learn the store basics", true, Priority::High, 1),
                seed(2, "Master reactive state management", false, Priority::High, 2),
                seed(3, "Build a complete project", false, Priority::Medium, 3),
            ],
            filter: Filter::All,
            next_id: 4,
        }
    }
}

impl TodoState {
    /// An empty list with ids starting at 1.
    pub fn empty() -> Self {
        Self {
            todos: Vec::new(),
            filter: Filter::All,
            next_id: 1,
        }
    }

    pub fn completed_todos(&self) -> Vec<Todo> {
        self.todos.iter().filter(|t| t.completed).cloned().collect()
    }

    pub fn active_todos(&self) -> Vec<Todo> {
        self.todos.iter().filter(|t| !t.completed).cloned().collect()
    }

    pub fn filtered_todos(&self) -> Vec<Todo> {
        self.todos
            .iter()
            .filter(|t| self.filter.matches(t))
            .cloned()
            .collect()
    }

    pub fn todo_stats(&self) -> TodoStats {
        let total = self.todos.len();
        let completed = self.todos.iter().filter(|t| t.completed).count();
        let completion_rate = if total > 0 {
            (completed as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };
        TodoStats {
            total,
            completed,
            active: total - completed,
            completion_rate,
        }
    }

    pub fn todos_by_priority(&self) -> Vec<PriorityGroup> {
        let mut groups: Vec<PriorityGroup> = Vec::new();
        for todo in &self.todos {
            match groups.iter_mut().find(|g| g.priority == todo.priority) {
                Some(group) => group.todos.push(todo.clone()),
                None => groups.push(PriorityGroup {
                    priority: todo.priority,
                    todos: vec![todo.clone()],
                }),
            }
        }
        groups
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }
}

/// A todo list with filtering, grouping and sorting.
///
/// Invalid input (blank text, unknown ids) leaves the list untouched; the
/// boolean-returning actions report whether anything changed.
#[derive(Clone)]
pub struct TodoStore {
    store: Store<TodoState>,
    filtered: Memo<TodoState, Vec<Todo>>,
    stats: Memo<TodoState, TodoStats>,
    by_priority: Memo<TodoState, Vec<PriorityGroup>>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    /// A store seeded with three example items.
    pub fn new() -> Self {
        Self::with_state(TodoState::default())
    }

    pub fn with_state(state: TodoState) -> Self {
        let store = Store::new(state);
        Self {
            filtered: Memo::new(&store, TodoState::filtered_todos),
            stats: Memo::new(&store, TodoState::todo_stats),
            by_priority: Memo::new(&store, TodoState::todos_by_priority),
            store,
        }
    }

    pub fn state(&self) -> TodoState {
        self.store.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TodoState) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    pub fn all_todos(&self) -> Vec<Todo> {
        self.store.read(|s| s.todos.clone())
    }

    pub fn filter(&self) -> Filter {
        self.store.read(|s| s.filter)
    }

    pub fn completed_todos(&self) -> Vec<Todo> {
        self.store.read(TodoState::completed_todos)
    }

    pub fn active_todos(&self) -> Vec<Todo> {
        self.store.read(TodoState::active_todos)
    }

    pub fn filtered_todos(&self) -> Vec<Todo> {
        self.filtered.get()
    }

    pub fn todo_stats(&self) -> TodoStats {
        self.stats.get()
    }

    pub fn todos_by_priority(&self) -> Vec<PriorityGroup> {
        self.by_priority.get()
    }

    /// Insert a new item at the front; returns its id, or `None` for blank text.
    pub fn add_todo(&self, text: &str, priority: Priority) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring blank todo");
            return None;
        }

        let text = text.to_string();
        let id = self.store.update(|s| {
            let id = s.next_id;
            s.next_id += 1;
            s.todos.insert(
                0,
                Todo {
                    id,
                    text,
                    completed: false,
                    priority,
                    created_at: Utc::now(),
                },
            );
            id
        });
        debug!(id, %priority, "todo added");
        Some(id)
    }

    pub fn toggle_todo(&self, id: u64) -> bool {
        self.modify(id, |todo| todo.completed = !todo.completed)
    }

    pub fn remove_todo(&self, id: u64) -> bool {
        let removed = self.store.update(|s| {
            let before = s.todos.len();
            s.todos.retain(|t| t.id != id);
            s.todos.len() != before
        });
        if !removed {
            debug!(id, "remove ignored, no such todo");
        }
        removed
    }

    /// Replace an item's text with `new_text` trimmed; blank text is ignored.
    pub fn edit_todo(&self, id: u64, new_text: &str) -> bool {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            debug!(id, "ignoring blank edit");
            return false;
        }
        let new_text = new_text.to_string();
        self.modify(id, move |todo| todo.text = new_text)
    }

    pub fn set_priority(&self, id: u64, priority: Priority) -> bool {
        self.modify(id, |todo| todo.priority = priority)
    }

    pub fn set_filter(&self, filter: Filter) {
        self.store.update(|s| s.filter = filter);
    }

    pub fn clear_completed(&self) {
        let removed = self.store.update(|s| {
            let before = s.todos.len();
            s.todos.retain(|t| !t.completed);
            before - s.todos.len()
        });
        debug!(removed, "cleared completed todos");
    }

    pub fn mark_all_completed(&self) {
        self.set_all(true);
    }

    pub fn mark_all_active(&self) {
        self.set_all(false);
    }

    /// Order items high, medium, low.
    pub fn sort_by_priority(&self) {
        self.store
            .update(|s| s.todos.sort_by_key(|t| Reverse(t.priority.rank())));
    }

    /// Order items by creation time, newest first unless `ascending`.
    pub fn sort_by_date(&self, ascending: bool) {
        self.store.update(|s| {
            if ascending {
                s.todos.sort_by_key(|t| t.created_at);
            } else {
                s.todos.sort_by_key(|t| Reverse(t.created_at));
            }
        });
    }

    fn set_all(&self, completed: bool) {
        self.store.update(|s| {
            for todo in &mut s.todos {
                todo.completed = completed;
            }
        });
    }

    fn modify<F>(&self, id: u64, f: F) -> bool
    where
        F: FnOnce(&mut Todo),
    {
        let found = self.store.update(|s| match s.find_mut(id) {
            Some(todo) => {
                f(todo);
                true
            }
            None => false,
        });
        if !found {
            debug!(id, "todo not found");
        }
        found
    }
}
