use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{apply_patch, build_todo, TodoStore};
use crate::error::StoreError;
use crate::model::{NewTodo, Todo, TodoPatch};

/// Process-local collection. Contents are lost on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    todos: Arc<RwLock<HashMap<Uuid, Todo>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, input: NewTodo) -> Result<Todo, StoreError> {
        let todo = build_todo(input)?;
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn update_by_id(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.get_mut(&id) else {
            return Ok(None);
        };
        apply_patch(todo, patch)?;
        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.todos.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn buy_milk() -> NewTodo {
        NewTodo {
            title: Some("Buy milk".to_string()),
            description: Some("2%".to_string()),
            deadline: Some(Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn create_then_find_all() {
        let store = MemoryStore::new();
        let created = store.create(buy_milk()).await.unwrap();
        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![created.clone()]);
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn failed_create_stores_nothing() {
        let store = MemoryStore::new();
        let input = NewTodo {
            deadline: None,
            ..buy_milk()
        };
        assert!(store.create(input).await.is_err());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let store = MemoryStore::new();
        let created = store.create(buy_milk()).await.unwrap();
        let patch = TodoPatch {
            title: Some("Nope".to_string()),
            ..TodoPatch::default()
        };
        assert!(store.update_by_id(Uuid::new_v4(), patch).await.unwrap().is_none());
        assert_eq!(store.find_all().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let created = store.create(buy_milk()).await.unwrap();
        assert!(store.delete_by_id(created.id).await.unwrap());
        assert!(!store.delete_by_id(created.id).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
