use std::collections::HashMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{apply_patch, build_todo, TodoStore};
use crate::error::StoreError;
use crate::model::{NewTodo, Todo, TodoPatch};

/// Collection backed by a single JSON document file.
///
/// The whole collection is kept in memory and the file is rewritten after
/// every mutation while the write lock is held. The new document is written
/// to a temp file, synced to disk, then renamed over the old one, so a crash
/// or power loss leaves either the old or the new document. A mutation whose
/// write fails is rolled back in memory before the error is returned.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    todos: RwLock<HashMap<Uuid, Todo>>,
}

impl FileStore {
    /// Load the collection at `path`. A missing or empty file is an empty
    /// collection.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let todos = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => {
                let list: Vec<Todo> = serde_json::from_slice(&bytes)?;
                list.into_iter().map(|todo| (todo.id, todo)).collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), count = todos.len(), "loaded todo document");
        Ok(Self {
            path,
            todos: RwLock::new(todos),
        })
    }

    async fn persist(&self, todos: &HashMap<Uuid, Todo>) -> Result<(), StoreError> {
        let mut list: Vec<&Todo> = todos.values().collect();
        list.sort_by_key(|todo| todo.id);
        let bytes = serde_json::to_vec_pretty(&list)?;

        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        // The new document is in place; a failed directory sync only weakens
        // durability of the rename.
        if let Err(e) = sync_parent(&self.path).await {
            warn!(path = %self.path.display(), error = %e, "directory sync failed");
        }
        Ok(())
    }
}

#[cfg(unix)]
async fn sync_parent(path: &Path) -> std::io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => tokio::fs::File::open(dir).await?.sync_all().await,
        None => Ok(()),
    }
}

#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl TodoStore for FileStore {
    async fn create(&self, input: NewTodo) -> Result<Todo, StoreError> {
        let todo = build_todo(input)?;
        let mut todos = self.todos.write().await;
        todos.insert(todo.id, todo.clone());
        if let Err(e) = self.persist(&todos).await {
            todos.remove(&todo.id);
            return Err(e);
        }
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
        let previous = todo.clone();
        apply_patch(todo, patch)?;
        let updated = todo.clone();
        if let Err(e) = self.persist(&todos).await {
            todos.insert(id, previous);
            return Err(e);
        }
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut todos = self.todos.write().await;
        let Some(removed) = todos.remove(&id) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&todos).await {
            todos.insert(id, removed);
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pay_rent() -> NewTodo {
        NewTodo {
            title: Some("Pay rent".to_string()),
            description: None,
            deadline: Some(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested/todos.json")).await.unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");

        let store = FileStore::open(&path).await.unwrap();
        let kept = store.create(pay_rent()).await.unwrap();
        let dropped = store.create(pay_rent()).await.unwrap();
        let patch = TodoPatch {
            description: Some("before the 5th".to_string()),
            completed: Some(true),
            ..TodoPatch::default()
        };
        let updated = store.update_by_id(kept.id, patch).await.unwrap().unwrap();
        assert!(store.delete_by_id(dropped.id).await.unwrap());
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.find_all().await.unwrap(), vec![updated]);
    }

    #[tokio::test]
    async fn write_replaces_document_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let store = FileStore::open(&path).await.unwrap();
        let created = store.create(pay_rent()).await.unwrap();

        assert!(!dir.path().join("todos.json.tmp").exists());
        let on_disk: Vec<Todo> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec![created]);
    }

    #[tokio::test]
    async fn corrupt_document_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Encoding(_)));
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let store = FileStore::open(&path).await.unwrap();
        let created = store.create(pay_rent()).await.unwrap();

        // A directory squatting on the temp path makes the next write fail.
        std::fs::create_dir(dir.path().join("todos.json.tmp")).unwrap();

        let err = store.delete_by_id(created.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.find_all().await.unwrap(), vec![created]);
    }
}
