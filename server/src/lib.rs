//! HTTP service for the todo tracker.
//!
//! # Overview
//! Exposes a flat collection of todo items over JSON/HTTP. Responses carry an
//! `isOverdue` flag derived from the item's deadline at the moment the
//! response is built, so the flag tracks the clock rather than the time the
//! item was written.
//!
//! # Design
//! - Storage sits behind the `TodoStore` trait; `AppState` carries it as an
//!   `Arc<dyn TodoStore>` together with the clock used for derived status.
//! - Errors are rendered uniformly as `{"message": ...}` by `ApiError`.
//! - DTOs are defined independently from the `todo-core` client crate;
//!   integration tests there catch schema drift.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::{ApiError, StoreError};
pub use model::{NewTodo, Todo, TodoPatch, TodoView};
pub use store::{FileStore, MemoryStore, TodoStore};

/// Source of "now" for derived fields.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    clock: Clock,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Replace the wall clock, e.g. to pin "now" in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn view(&self, todo: Todo) -> TodoView {
        TodoView::at(todo, self.now())
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
