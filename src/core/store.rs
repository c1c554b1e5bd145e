use std::sync::Arc;

use chrono::{Local, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::Settings;
use crate::core::note::{self, Note, NoteId, NotePatch};
use crate::core::task::{Task, TaskId, TaskPatch};
use crate::storage::{LocalGateway, StorageError};
use crate::sync::{self, RecordPatch, RemoteGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityId {
    Task(TaskId),
    Note(NoteId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Create,
    Update,
    Archive,
}

/// Change and sync notifications emitted over the store's channel. The
/// driving layer re-renders on the `*Changed` events, shows a blocking
/// alert for `SyncFailed { alert: true }`, and answers `RemoteLinked` by
/// calling [`EntityStore::apply_remote_link`].
#[derive(Debug, Clone)]
pub enum StoreEvent {
    TasksChanged,
    NotesChanged,
    SettingsChanged,
    RemoteLinked { id: EntityId, page_id: String },
    RemoteSynced { id: EntityId, op: SyncOp },
    SyncFailed { id: EntityId, op: SyncOp, message: String, alert: bool },
}

/// Owner of the task and note collections. All mutations apply in memory
/// first, then persist the full collection through the local gateway, and
/// finally spawn a detached best-effort remote sync when one is
/// configured. Remote outcomes never roll local state back; they only
/// arrive as events.
///
/// Mutations take `&mut self`, so a single owner (the UI loop) serializes
/// them; only the gateway calls suspend.
pub struct EntityStore<L, R> {
    tasks: Vec<Task>,
    notes: Vec<Note>,
    settings: Settings,
    local: L,
    remote: Arc<R>,
    events: UnboundedSender<StoreEvent>,
}

impl<L: LocalGateway, R: RemoteGateway> EntityStore<L, R> {
    pub fn new(local: L, remote: R) -> (Self, UnboundedReceiver<StoreEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            tasks: Vec::new(),
            notes: Vec::new(),
            settings: Settings::default(),
            local,
            remote: Arc::new(remote),
            events,
        };
        (store, receiver)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Startup load. Settings always replace the defaults; the task and
    /// note collections are only replaced by non-empty stored data. Load
    /// errors are logged and leave the current state alone.
    pub async fn load_all(&mut self) {
        match self.local.load_settings().await {
            Ok(settings) => {
                self.settings = settings;
                self.emit(StoreEvent::SettingsChanged);
            }
            Err(e) => log::error!("Failed to load settings: {}", e),
        }
        match self.local.load_tasks().await {
            Ok(tasks) if !tasks.is_empty() => {
                log::info!("Loaded {} tasks", tasks.len());
                self.tasks = tasks;
                self.emit(StoreEvent::TasksChanged);
            }
            Ok(_) => {}
            Err(e) => log::error!("Failed to load tasks: {}", e),
        }
        match self.local.load_notes().await {
            Ok(notes) if !notes.is_empty() => {
                log::info!("Loaded {} notes", notes.len());
                self.notes = notes;
                self.emit(StoreEvent::NotesChanged);
            }
            Ok(_) => {}
            Err(e) => log::error!("Failed to load notes: {}", e),
        }
    }

    pub async fn add_task(&mut self, text: impl Into<String>) -> Result<TaskId, StorageError> {
        let id = self.next_task_id();
        let task = Task::new(id, text);
        self.tasks.insert(0, task.clone());
        self.emit(StoreEvent::TasksChanged);

        let persisted = self.local.save_tasks(&self.tasks).await;
        if let Err(e) = &persisted {
            log::error!("Failed to persist tasks: {}", e);
        }

        if let Some((key, db)) = self.sync_target(&self.settings.notion_tasks_database_id) {
            let props = sync::task_create_props(&task, Local::now().date_naive());
            self.spawn_create(EntityId::Task(id), key, db, props);
        }

        persisted.map(|_| id)
    }

    /// Merge a partial update into the matching task. An unknown id is a
    /// soft no-op. The remote patch carries only the supplied fields.
    pub async fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> Result<(), StorageError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            log::debug!("Update for unknown task {}", id);
            return Ok(());
        };
        if let Some(text) = &patch.text {
            task.text = text.clone();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(date) = &patch.date {
            task.date = date.clone();
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        let page_id = task.notion_page_id.clone();
        self.emit(StoreEvent::TasksChanged);

        let persisted = self.local.save_tasks(&self.tasks).await;

        if let Some(page_id) = page_id.filter(|_| !self.settings.notion_key.is_empty()) {
            let props = sync::task_update_props(&patch, Local::now().date_naive());
            if !props.is_empty() {
                self.spawn_update(
                    EntityId::Task(id),
                    page_id,
                    RecordPatch::Properties(props),
                    SyncOp::Update,
                );
            }
        }

        persisted
    }

    pub async fn toggle_task(&mut self, id: TaskId) -> Result<(), StorageError> {
        let Some(task) = self.tasks.iter().find(|t| t.id == id) else {
            log::debug!("Toggle for unknown task {}", id);
            return Ok(());
        };
        let patch = TaskPatch {
            completed: Some(!task.completed),
            ..Default::default()
        };
        self.update_task(id, patch).await
    }

    /// Remove a task locally; a linked remote record is archived, never
    /// deleted.
    pub async fn delete_task(&mut self, id: TaskId) -> Result<(), StorageError> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            log::debug!("Delete for unknown task {}", id);
            return Ok(());
        };
        let removed = self.tasks.remove(pos);
        self.emit(StoreEvent::TasksChanged);

        let persisted = self.local.save_tasks(&self.tasks).await;

        if let Some(page_id) = removed
            .notion_page_id
            .filter(|_| !self.settings.notion_key.is_empty())
        {
            self.spawn_update(EntityId::Task(id), page_id, RecordPatch::Archive, SyncOp::Archive);
        }

        persisted
    }

    pub async fn add_note(&mut self, content: impl Into<String>) -> Result<NoteId, StorageError> {
        let id = self.next_note_id();
        let new_note = Note::new(id.clone(), content);
        self.notes.insert(0, new_note.clone());
        self.emit(StoreEvent::NotesChanged);

        let persisted = self.local.save_notes(&self.notes).await;
        if let Err(e) = &persisted {
            log::error!("Failed to persist notes: {}", e);
        }

        if let Some((key, db)) = self.sync_target(&self.settings.notion_notes_database_id) {
            let props = sync::note_create_props(&new_note, Local::now().date_naive());
            self.spawn_create(EntityId::Note(id.clone()), key, db, props);
        }

        persisted.map(|_| id)
    }

    /// Merge a partial update into the matching note. A content change
    /// rederives the tag array wholesale, so quick-added tags do not
    /// survive it (see DESIGN.md). Only content changes are pushed to
    /// the remote record.
    pub async fn update_note(&mut self, id: &str, patch: NotePatch) -> Result<(), StorageError> {
        let Some(found) = self.notes.iter_mut().find(|n| n.id == id) else {
            log::debug!("Update for unknown note {}", id);
            return Ok(());
        };
        if let Some(tags) = patch.tags {
            found.tags = tags;
        }
        if let Some(archived) = patch.is_archived {
            found.is_archived = archived;
        }
        if let Some(pinned) = patch.is_pinned {
            found.is_pinned = pinned;
        }
        if let Some(content) = &patch.content {
            found.content = content.clone();
            found.tags = note::extract_tags(content);
        }
        let page_id = found.notion_page_id.clone();
        self.emit(StoreEvent::NotesChanged);

        let persisted = self.local.save_notes(&self.notes).await;

        if let Some(content) = patch.content {
            if let Some(page_id) = page_id.filter(|_| !self.settings.notion_key.is_empty()) {
                self.spawn_update(
                    EntityId::Note(id.to_string()),
                    page_id,
                    RecordPatch::Properties(sync::note_update_props(&content)),
                    SyncOp::Update,
                );
            }
        }

        persisted
    }

    /// The quick-add affordance: append a tag without touching content.
    /// Already-present tags are ignored; nothing is synced.
    pub async fn add_tag_to_note(&mut self, id: &str, tag: &str) -> Result<(), StorageError> {
        let Some(found) = self.notes.iter().find(|n| n.id == id) else {
            return Ok(());
        };
        if found.tags.iter().any(|t| t == tag) {
            return Ok(());
        }
        let mut tags = found.tags.clone();
        tags.push(tag.to_string());
        self.update_note(
            id,
            NotePatch {
                tags: Some(tags),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_note(&mut self, id: &str) -> Result<(), StorageError> {
        let Some(pos) = self.notes.iter().position(|n| n.id == id) else {
            log::debug!("Delete for unknown note {}", id);
            return Ok(());
        };
        let removed = self.notes.remove(pos);
        self.emit(StoreEvent::NotesChanged);

        let persisted = self.local.save_notes(&self.notes).await;

        if let Some(page_id) = removed
            .notion_page_id
            .filter(|_| !self.settings.notion_key.is_empty())
        {
            self.spawn_update(
                EntityId::Note(id.to_string()),
                page_id,
                RecordPatch::Archive,
                SyncOp::Archive,
            );
        }

        persisted
    }

    pub async fn update_settings(&mut self, settings: Settings) -> Result<(), StorageError> {
        self.settings = settings;
        self.emit(StoreEvent::SettingsChanged);
        self.local.save_settings(&self.settings).await
    }

    /// Record the linkage id a create-sync returned, through the normal
    /// apply + persist path. Called by the event loop on `RemoteLinked`.
    /// A linkage id, once set, is never cleared by local edits.
    pub async fn apply_remote_link(
        &mut self,
        id: EntityId,
        page_id: String,
    ) -> Result<(), StorageError> {
        match id {
            EntityId::Task(task_id) => {
                let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
                    return Ok(());
                };
                task.notion_page_id = Some(page_id);
                self.emit(StoreEvent::TasksChanged);
                self.local.save_tasks(&self.tasks).await
            }
            EntityId::Note(note_id) => {
                let Some(found) = self.notes.iter_mut().find(|n| n.id == note_id) else {
                    return Ok(());
                };
                found.notion_page_id = Some(page_id);
                self.emit(StoreEvent::NotesChanged);
                self.local.save_notes(&self.notes).await
            }
        }
    }

    fn emit(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }

    /// Sync is configured for a kind when the key and that kind's
    /// (sanitized) database id are both non-empty.
    fn sync_target(&self, database_id: &str) -> Option<(String, String)> {
        let db = sync::sanitize_database_id(database_id);
        if self.settings.notion_key.is_empty() || db.is_empty() {
            return None;
        }
        Some((self.settings.notion_key.clone(), db))
    }

    fn spawn_create(&self, id: EntityId, key: String, db: String, props: sync::RecordProps) {
        let remote = Arc::clone(&self.remote);
        let events = self.events.clone();
        tokio::spawn(async move {
            match remote.create_record(&key, &db, props).await {
                Ok(page_id) if sync::is_usable_page_id(&page_id) => {
                    log::info!("Created remote record {} for {:?}", page_id, id);
                    let _ = events.send(StoreEvent::RemoteLinked { id, page_id });
                }
                Ok(page_id) => {
                    log::warn!("Create sync returned placeholder id {:?} for {:?}", page_id, id);
                    let _ = events.send(StoreEvent::RemoteSynced { id, op: SyncOp::Create });
                }
                Err(message) => {
                    log::error!("Create sync failed for {:?}: {}", id, message);
                    let _ = events.send(StoreEvent::SyncFailed {
                        id,
                        op: SyncOp::Create,
                        message,
                        alert: true,
                    });
                }
            }
        });
    }

    fn spawn_update(&self, id: EntityId, page_id: String, patch: RecordPatch, op: SyncOp) {
        let key = self.settings.notion_key.clone();
        let remote = Arc::clone(&self.remote);
        let events = self.events.clone();
        tokio::spawn(async move {
            match remote.update_record(&key, &page_id, patch).await {
                Ok(()) => {
                    let _ = events.send(StoreEvent::RemoteSynced { id, op });
                }
                Err(message) => {
                    log::warn!("{:?} sync failed for {:?}: {}", op, id, message);
                    let _ = events.send(StoreEvent::SyncFailed {
                        id,
                        op,
                        message,
                        alert: false,
                    });
                }
            }
        });
    }

    fn next_task_id(&self) -> TaskId {
        let mut id = Utc::now().timestamp_millis();
        while self.tasks.iter().any(|t| t.id == id) {
            id += 1;
        }
        id
    }

    fn next_note_id(&self) -> NoteId {
        let mut id = Utc::now().timestamp_millis();
        while self.notes.iter().any(|n| n.id == id.to_string()) {
            id += 1;
        }
        id.to_string()
    }
}
