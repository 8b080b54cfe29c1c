//! Composition root: one instance of each store plus the route table the
//! host router maps onto views.

use crate::config::StoreConfig;
use crate::counter::CounterStore;
use crate::todos::TodoStore;
use crate::user::UserStore;

/// Views the host application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Counter,
    TodoList,
    UserProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: "Home",
        view: View::Home,
    },
    Route {
        path: "/counter",
        name: "Counter",
        view: View::Counter,
    },
    Route {
        path: "/todos",
        name: "TodoList",
        view: View::TodoList,
    },
    Route {
        path: "/profile",
        name: "UserProfile",
        view: View::UserProfile,
    },
];

/// The three stores, created once and shared with their views.
#[derive(Clone, Default)]
pub struct App {
    counter: CounterStore,
    todos: TodoStore,
    user: UserStore,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        Self {
            counter: CounterStore::with_config(config),
            todos: TodoStore::new(),
            user: UserStore::with_config(config),
        }
    }

    pub fn counter(&self) -> &CounterStore {
        &self.counter
    }

    pub fn todos(&self) -> &TodoStore {
        &self.todos
    }

    pub fn user(&self) -> &UserStore {
        &self.user
    }

    pub fn routes() -> &'static [Route] {
        ROUTES
    }

    /// Find the route for `path`, ignoring a trailing slash.
    pub fn resolve(path: &str) -> Option<&'static Route> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        ROUTES.iter().find(|route| route.path == trimmed)
    }
}
