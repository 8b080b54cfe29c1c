//! Todo list store: items, view filter, grouping and sorting.

mod todos;

pub use todos::{Filter, Priority, PriorityGroup, Todo, TodoState, TodoStats, TodoStore};
