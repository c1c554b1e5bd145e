pub mod notion;

use std::future::Future;

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::config::Settings;
use crate::core::note::{self, Note};
use crate::core::task::{Task, TaskPatch};
use crate::core::temporal::resolve_sync_date;

/// Placeholder strings the gateway may return in place of a page id when
/// the create result was indeterminate. Never stored as a linkage id.
pub const PLACEHOLDER_IDS: [&str; 2] = ["Success", "Unknown ID"];

pub fn is_usable_page_id(id: &str) -> bool {
    !id.is_empty() && !PLACEHOLDER_IDS.contains(&id)
}

/// Extract a database id from a pasted Notion URL. Plain ids pass
/// through trimmed; URLs keep the segment after the last `/` with any
/// query string dropped.
pub fn sanitize_database_id(id: &str) -> String {
    if !id.contains('/') {
        return id.trim().to_string();
    }
    let last = id.rsplit('/').next().unwrap_or_default();
    last.split('?').next().unwrap_or_default().trim().to_string()
}

/// One-way record operations against the external workspace service.
/// Implementations surface network/auth/schema failures as their error
/// string; callers decide the policy around them.
pub trait RemoteGateway: Send + Sync + 'static {
    /// Create a record in a database; returns the new record's id.
    fn create_record(
        &self,
        key: &str,
        database_id: &str,
        props: RecordProps,
    ) -> impl Future<Output = Result<String, String>> + Send;

    /// Patch an existing record: partial properties or a soft archive.
    fn update_record(
        &self,
        key: &str,
        page_id: &str,
        patch: RecordPatch,
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Validate that the credential can reach the database.
    fn test_connection(
        &self,
        key: &str,
        database_id: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;
}

/// Typed builder for a record's property map, one setter per property
/// kind the field mappings use.
#[derive(Debug, Clone, Default)]
pub struct RecordProps {
    props: Map<String, Value>,
}

impl RecordProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, name: &str, text: &str) -> Self {
        self.props.insert(
            name.to_string(),
            json!({ "title": [{ "text": { "content": text } }] }),
        );
        self
    }

    pub fn select(mut self, name: &str, value: &str) -> Self {
        self.props
            .insert(name.to_string(), json!({ "select": { "name": value } }));
        self
    }

    /// A date property; `None` clears the field on the remote record.
    pub fn date(mut self, name: &str, date: Option<NaiveDate>) -> Self {
        let value = match date {
            Some(d) => json!({ "date": { "start": d.format("%Y-%m-%d").to_string() } }),
            None => Value::Null,
        };
        self.props.insert(name.to_string(), value);
        self
    }

    pub fn checkbox(mut self, name: &str, checked: bool) -> Self {
        self.props
            .insert(name.to_string(), json!({ "checkbox": checked }));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.props)
    }
}

/// Body of an update-record call: either a partial property patch or a
/// soft archive. The service never sees a hard delete.
#[derive(Debug, Clone)]
pub enum RecordPatch {
    Archive,
    Properties(RecordProps),
}

impl RecordPatch {
    pub fn into_body(self) -> Value {
        match self {
            Self::Archive => json!({ "archived": true }),
            Self::Properties(props) => json!({ "properties": props.into_value() }),
        }
    }
}

/// Create payload for a task record.
pub fn task_create_props(task: &Task, today: NaiveDate) -> RecordProps {
    RecordProps::new()
        .title("Name", &task.text)
        .date("date", Some(today))
        .select("Priority", task.priority.as_select())
        .checkbox("Done", false)
}

/// Update payload carrying only the patched task fields. Empty when the
/// patch holds nothing the remote record tracks.
pub fn task_update_props(patch: &TaskPatch, today: NaiveDate) -> RecordProps {
    let mut props = RecordProps::new();
    if let Some(text) = &patch.text {
        props = props.title("Name", text);
    }
    if let Some(priority) = &patch.priority {
        props = props.select("Priority", priority.as_select());
    }
    if let Some(date) = &patch.date {
        props = props.date("date", resolve_sync_date(date, today));
    }
    if let Some(completed) = patch.completed {
        props = props.checkbox("Done", completed);
    }
    props
}

/// Create payload for a note record: markers stripped out of the title,
/// first tag as the single-select `Tags` value.
pub fn note_create_props(note_entity: &Note, today: NaiveDate) -> RecordProps {
    let first_tag = note_entity
        .tags
        .first()
        .map(String::as_str)
        .unwrap_or(note::UNTAGGED);
    RecordProps::new()
        .title("Name", &note::strip_tag_markers(&note_entity.content))
        .date("date", Some(today))
        .select("Tags", first_tag)
}

/// Update payload for a note whose content changed: title and first tag
/// are recomputed from the new content.
pub fn note_update_props(content: &str) -> RecordProps {
    let tags = note::extract_tags(content);
    RecordProps::new()
        .title("Name", &note::strip_tag_markers(content))
        .select("Tags", &tags[0])
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Please enter your Notion integration token")]
    MissingToken,
    #[error("Please enter at least one database id (tasks or notes)")]
    MissingDatabases,
    #[error("Connection test failed: {0}")]
    Failed(String),
}

/// Settings-panel connection check: validates the configuration shape,
/// then tests each configured database, reporting one label per success.
pub async fn verify_connection<R: RemoteGateway>(
    remote: &R,
    settings: &Settings,
) -> Result<Vec<String>, ConnectionError> {
    if settings.notion_key.is_empty() {
        return Err(ConnectionError::MissingToken);
    }
    let tasks_db = sanitize_database_id(&settings.notion_tasks_database_id);
    let notes_db = sanitize_database_id(&settings.notion_notes_database_id);
    if tasks_db.is_empty() && notes_db.is_empty() {
        return Err(ConnectionError::MissingDatabases);
    }

    let mut verified = Vec::new();
    if !tasks_db.is_empty() {
        remote
            .test_connection(&settings.notion_key, &tasks_db)
            .await
            .map_err(ConnectionError::Failed)?;
        verified.push("Tasks database verified".to_string());
    }
    if !notes_db.is_empty() {
        remote
            .test_connection(&settings.notion_key, &notes_db)
            .await
            .map_err(ConnectionError::Failed)?;
        verified.push("Notes database verified".to_string());
    }
    Ok(verified)
}
