//! Todo records and request payloads.
//!
//! `Todo` is the stored document. `TodoView` is what goes over the wire: the
//! stored fields plus the derived `isOverdue` flag, which is computed against
//! a caller-supplied instant and never persisted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A persisted todo item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Open items whose deadline lies strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now && !self.completed
    }
}

/// A todo as returned by the API, with status derived at response time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoView {
    #[serde(flatten)]
    pub todo: Todo,
    #[serde(rename = "isOverdue")]
    pub is_overdue: bool,
}

impl TodoView {
    pub fn at(todo: Todo, now: DateTime<Utc>) -> Self {
        let is_overdue = todo.is_overdue(now);
        Self { todo, is_overdue }
    }
}

/// Payload for `POST /todos`.
///
/// Every field is optional at the decoding layer so that a missing `title`
/// or `deadline` reaches the store and fails there as a validation error.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_deadline")]
    pub deadline: Option<DateTime<Utc>>,
}

/// Payload for `PUT /todos/{id}`.
///
/// Only `title`, `description` and `completed` are mutable. The deadline is
/// fixed at creation; a `deadline` key in the body is ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Parse a deadline as RFC 3339, or as a zone-less `datetime-local` / plain
/// date value taken to be UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_deadline(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid deadline `{raw}`"))),
    }
}
