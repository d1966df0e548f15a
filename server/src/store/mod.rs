//! Persistence for todo documents.
//!
//! `TodoStore` is the seam between the HTTP layer and storage. Handlers hold
//! an `Arc<dyn TodoStore>` and never see which backend is behind it.

mod file;
mod memory;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{NewTodo, Todo, TodoPatch};

pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a new item under a freshly assigned id.
    async fn create(&self, input: NewTodo) -> Result<Todo, StoreError>;

    /// Snapshot of every stored item, in no particular order.
    async fn find_all(&self) -> Result<Vec<Todo>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Apply `patch` to the item with `id`. `Ok(None)` when no item matches.
    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError>;

    /// Remove the item with `id`, reporting whether it existed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Open the backend selected by configuration: a document file when a path
/// is given, otherwise an in-memory collection.
pub async fn open(data_path: Option<&Path>) -> Result<Arc<dyn TodoStore>, StoreError> {
    match data_path {
        Some(path) => Ok(Arc::new(FileStore::open(path).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Validate a create payload and build the document to insert.
pub(crate) fn build_todo(input: NewTodo) -> Result<Todo, StoreError> {
    let title = match input.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(StoreError::Validation("title is required".to_string())),
    };
    let deadline = input
        .deadline
        .ok_or_else(|| StoreError::Validation("deadline is required".to_string()))?;
    Ok(Todo {
        id: Uuid::new_v4(),
        title,
        description: input.description,
        deadline,
        completed: false,
    })
}

/// Apply a partial update. Validation happens before any field is touched.
pub(crate) fn apply_patch(todo: &mut Todo, patch: TodoPatch) -> Result<(), StoreError> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err(StoreError::Validation("title must not be empty".to_string()));
        }
    }
    if let Some(title) = patch.title {
        todo.title = title;
    }
    if let Some(description) = patch.description {
        todo.description = Some(description);
    }
    if let Some(completed) = patch.completed {
        todo.completed = completed;
    }
    Ok(())
}
