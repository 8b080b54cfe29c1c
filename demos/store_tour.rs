//! Walk through all three stores the way the demo views would drive them.
//!
//! Run with `RUST_LOG=debug cargo run --example store_tour` to see the
//! store events.

use std::time::Duration;
use stashbox::telemetry::init_tracing;
use stashbox::todos::{Filter, Priority};
use stashbox::user::ProfileUpdate;
use stashbox::{App, StoreConfig};

#[tokio::main]
async fn main() -> stashbox::Result<()> {
    init_tracing();

    let config = StoreConfig {
        login_delay_ms: 300,
        fetch_delay_ms: 200,
        ..StoreConfig::default()
    };
    let app = App::with_config(&config);

    println!("=== Counter ===\n");
    let counter = app.counter();
    let _log = counter.subscribe(|state| {
        println!("   [State] Count: {}, History: {}", state.count, state.history.len());
    });

    counter.increment();
    counter.increment();
    counter.decrement();
    counter.set_count(10);
    let count = counter.increment_async(Duration::from_millis(200)).await;
    println!(
        "   Count: {} | Double: {} | Even: {} | Status: {}",
        count,
        counter.double_count(),
        counter.is_even(),
        counter.count_status()
    );
    counter.reset();
    for entry in counter.history() {
        println!("   {} {:>4} {}", entry.action, entry.value, entry.description);
    }

    println!("\n=== Todos ===\n");
    let todos = app.todos();
    todos.add_todo("Write the release notes", Priority::Low);
    todos.add_todo("Fix the login bug", Priority::High);
    todos.toggle_todo(2);
    todos.sort_by_priority();
    for todo in todos.all_todos() {
        let status = if todo.completed { "✓" } else { " " };
        println!("   [{}] {:<6} {}", status, todo.priority, todo.text);
    }

    todos.set_filter("active".parse::<Filter>()?);
    println!("\n   Active: {}", todos.filtered_todos().len());
    let stats = todos.todo_stats();
    println!(
        "   Total: {} | Done: {} | Rate: {}%",
        stats.total, stats.completed, stats.completion_rate
    );
    for group in todos.todos_by_priority() {
        println!("   {}: {} item(s)", group.priority, group.todos.len());
    }

    println!("\n=== Session ===\n");
    let user = app.user();
    if let Err(err) = user.login("guest@example.com", "letmein").await {
        println!("   Login rejected: {err}");
    }
    user.login("admin@example.com", "admin123").await?;
    user.update_profile(ProfileUpdate {
        last_name: Some("Operator".to_string()),
        ..ProfileUpdate::default()
    });
    user.fetch_user_data().await;
    user.toggle_theme();
    println!(
        "   {} ({}) theme={:?} avatar={}",
        user.full_name(),
        user.user_role(),
        user.preferences().theme,
        user.avatar_url()
    );
    user.logout();
    for record in user.login_history() {
        println!("   {:?} {} {}", record.kind, record.timestamp, record.message);
    }

    println!("\n✓ Tour complete!");
    Ok(())
}
