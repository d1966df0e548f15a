//! View model for the single-page todo UI.
//!
//! `TodoPage` owns everything the form/list screen shows: the loaded items,
//! the create form, the single in-place edit, flash messages and the pending
//! delete confirmation. It follows the same host-does-IO split as
//! `TodoClient`: actions return the `HttpRequest` to send (or `None` when an
//! input guard fails) and `apply_*` methods fold the host's `HttpResponse`
//! back into the page.
//!
//! The list is only ever updated from records the server returned, so items
//! always carry their server-assigned ids.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::client::TodoClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{parse_deadline, CreateTodo, Todo, UpdateTodo};

pub const ITEM_ADDED: &str = "Item added successfully.";
pub const ITEM_UPDATED: &str = "Item updated successfully.";
pub const CREATE_FAILED: &str = "Unable to create Todo item.";
pub const UPDATE_FAILED: &str = "Unable to update Todo item.";
pub const DELETE_FAILED: &str = "Unable to delete Todo item.";
pub const LOAD_FAILED: &str = "Unable to load Todo items.";
pub const DELETE_PROMPT: &str = "Are you sure want to delete?";

/// How long a success message stays visible.
pub const MESSAGE_TTL_SECS: i64 = 3;

/// Contents of the create form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftState {
    pub title: String,
    pub description: String,
    /// Raw deadline input; empty until one is chosen.
    pub deadline: String,
}

impl DraftState {
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn with_deadline(self, deadline: impl Into<String>) -> Self {
        Self {
            deadline: deadline.into(),
            ..self
        }
    }

    /// The create payload, if the draft is complete.
    pub fn to_create(&self) -> Option<CreateTodo> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return None;
        }
        let deadline = parse_deadline(&self.deadline)?;
        Some(CreateTodo {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            deadline,
        })
    }
}

/// Contents of the in-place edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    pub title: String,
    pub description: String,
}

impl EditDraft {
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    fn to_update(&self) -> Option<UpdateTodo> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return None;
        }
        Some(UpdateTodo::text(&self.title, &self.description))
    }
}

/// The one item currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: Uuid,
    pub draft: EditDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Flash {
    text: &'static str,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TodoPage {
    client: TodoClient,
    todos: Vec<Todo>,
    draft: DraftState,
    editing: Option<EditState>,
    flash: Option<Flash>,
    error: Option<&'static str>,
    pending_delete: Option<Uuid>,
}

impl TodoPage {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            todos: Vec::new(),
            draft: DraftState::default(),
            editing: None,
            flash: None,
            error: None,
            pending_delete: None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn message(&self) -> Option<&'static str> {
        self.flash.as_ref().map(|flash| flash.text)
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn pending_delete(&self) -> Option<Uuid> {
        self.pending_delete
    }

    // --- load ---

    /// Request for the initial fetch. There is no polling; the list only
    /// changes through the actions below or another `load`.
    pub fn load(&self) -> HttpRequest {
        self.client.build_list_todos()
    }

    pub fn apply_load(&mut self, response: HttpResponse) {
        match self.client.parse_list_todos(response) {
            Ok(todos) => self.todos = todos,
            Err(_) => self.error = Some(LOAD_FAILED),
        }
    }

    // --- create ---

    /// Replace the whole create form in one step.
    pub fn set_draft(&mut self, draft: DraftState) {
        self.draft = draft;
    }

    pub fn submit_create(&mut self) -> Option<HttpRequest> {
        self.error = None;
        let input = self.draft.to_create()?;
        match self.client.build_create_todo(&input) {
            Ok(request) => Some(request),
            Err(_) => {
                self.error = Some(CREATE_FAILED);
                None
            }
        }
    }

    pub fn apply_create(&mut self, response: HttpResponse, now: DateTime<Utc>) {
        match self.client.parse_create_todo(response) {
            Ok(todo) => {
                self.merge(todo);
                self.draft = DraftState::default();
                self.show(ITEM_ADDED, now);
            }
            Err(_) => self.error = Some(CREATE_FAILED),
        }
    }

    // --- edit ---

    /// Start editing `id`, replacing any edit already open. Returns `false`
    /// if the item is not on the page.
    pub fn begin_edit(&mut self, id: Uuid) -> bool {
        let Some(todo) = self.find(id) else {
            return false;
        };
        let draft = EditDraft {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
        };
        self.editing = Some(EditState { id, draft });
        true
    }

    /// Replace the edit form. Ignored when nothing is being edited.
    pub fn set_edit_draft(&mut self, draft: EditDraft) {
        if let Some(editing) = &mut self.editing {
            editing.draft = draft;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn submit_update(&mut self) -> Option<HttpRequest> {
        self.error = None;
        let editing = self.editing.as_ref()?;
        let input = editing.draft.to_update()?;
        match self.client.build_update_todo(editing.id, &input) {
            Ok(request) => Some(request),
            Err(_) => {
                self.error = Some(UPDATE_FAILED);
                None
            }
        }
    }

    pub fn apply_update(&mut self, response: HttpResponse, now: DateTime<Utc>) {
        match self.client.parse_update_todo(response) {
            Ok(todo) => {
                if self.editing.as_ref().is_some_and(|e| e.id == todo.id) {
                    self.editing = None;
                }
                self.merge(todo);
                self.show(ITEM_UPDATED, now);
            }
            Err(_) => self.error = Some(UPDATE_FAILED),
        }
    }

    // --- completion ---

    /// Flip the completion flag of `id`. `None` if the item is not on the page.
    pub fn toggle_completed(&mut self, id: Uuid) -> Option<HttpRequest> {
        self.error = None;
        let completed = self.find(id)?.completed;
        match self
            .client
            .build_update_todo(id, &UpdateTodo::completion(!completed))
        {
            Ok(request) => Some(request),
            Err(_) => {
                self.error = Some(UPDATE_FAILED);
                None
            }
        }
    }

    pub fn apply_toggle(&mut self, response: HttpResponse) {
        match self.client.parse_update_todo(response) {
            Ok(todo) => self.merge(todo),
            Err(_) => self.error = Some(UPDATE_FAILED),
        }
    }

    // --- delete ---

    /// Ask before deleting `id`. Returns the confirmation prompt to show.
    pub fn request_delete(&mut self, id: Uuid) -> Option<&'static str> {
        self.find(id)?;
        self.pending_delete = Some(id);
        Some(DELETE_PROMPT)
    }

    /// Resolve the pending confirmation; the request is only issued when the
    /// user agreed.
    pub fn confirm_delete(&mut self, confirmed: bool) -> Option<HttpRequest> {
        let id = self.pending_delete.take()?;
        if !confirmed {
            return None;
        }
        self.error = None;
        Some(self.client.build_delete_todo(id))
    }

    /// The item leaves the list only once the server confirmed the delete.
    pub fn apply_delete(&mut self, id: Uuid, response: HttpResponse) {
        match self.client.parse_delete_todo(response) {
            Ok(()) => {
                self.todos.retain(|todo| todo.id != id);
                if self.editing.as_ref().is_some_and(|e| e.id == id) {
                    self.editing = None;
                }
            }
            Err(_) => self.error = Some(DELETE_FAILED),
        }
    }

    // --- time ---

    /// Drop the success message once it has been visible long enough.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.flash.as_ref().is_some_and(|flash| now >= flash.expires_at) {
            self.flash = None;
        }
    }

    fn show(&mut self, text: &'static str, now: DateTime<Utc>) {
        self.flash = Some(Flash {
            text,
            expires_at: now + Duration::seconds(MESSAGE_TTL_SECS),
        });
    }

    fn find(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Put a server-returned record into the list, in place when present.
    fn merge(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => self.todos.push(todo),
        }
    }
}
