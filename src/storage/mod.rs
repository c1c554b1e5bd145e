use std::future::Future;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Settings;
use crate::core::note::Note;
use crate::core::task::Task;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable local persistence for tasks, notes and settings. Saves always
/// receive the entire collection; loads return empty/default when nothing
/// has been stored yet.
pub trait LocalGateway: Send + Sync {
    fn load_tasks(&self) -> impl Future<Output = Result<Vec<Task>, StorageError>> + Send;
    fn save_tasks(&self, tasks: &[Task]) -> impl Future<Output = Result<(), StorageError>> + Send;
    fn load_notes(&self) -> impl Future<Output = Result<Vec<Note>, StorageError>> + Send;
    fn save_notes(&self, notes: &[Note]) -> impl Future<Output = Result<(), StorageError>> + Send;
    fn load_settings(&self) -> impl Future<Output = Result<Settings, StorageError>> + Send;
    fn save_settings(
        &self,
        settings: &Settings,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

const TASKS_FILE: &str = "tasks.json";
const NOTES_FILE: &str = "notes.json";
const SETTINGS_FILE: &str = "settings.json";

/// File-backed gateway keeping each collection in its own JSON document
/// under the platform data directory.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("spacebar")
    }

    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, StorageError> {
        match tokio::fs::read(self.dir.join(file)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(self.dir.join(file), bytes).await?;
        Ok(())
    }
}

impl LocalGateway for JsonStore {
    async fn load_tasks(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.read_json(TASKS_FILE).await?.unwrap_or_default())
    }

    async fn save_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        self.write_json(TASKS_FILE, &tasks).await
    }

    async fn load_notes(&self) -> Result<Vec<Note>, StorageError> {
        Ok(self.read_json(NOTES_FILE).await?.unwrap_or_default())
    }

    async fn save_notes(&self, notes: &[Note]) -> Result<(), StorageError> {
        self.write_json(NOTES_FILE, &notes).await
    }

    async fn load_settings(&self) -> Result<Settings, StorageError> {
        Ok(self.read_json(SETTINGS_FILE).await?.unwrap_or_default())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        self.write_json(SETTINGS_FILE, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::core::task::Priority;

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonStore::new(tmp.path().join("data"));
        assert!(store.load_tasks().await.unwrap().is_empty());
        assert!(store.load_notes().await.unwrap().is_empty());
        assert_eq!(store.load_settings().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn collections_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonStore::new(tmp.path().join("data"));

        let mut task = Task::new(1, "write report #work");
        task.priority = Priority::P1;
        task.notion_page_id = Some("page-1".into());
        store.save_tasks(std::slice::from_ref(&task)).await.unwrap();

        let note = Note::new("100".to_string(), "retro notes #team");
        store.save_notes(std::slice::from_ref(&note)).await.unwrap();

        let tasks = store.load_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, task.text);
        assert_eq!(tasks[0].priority, Priority::P1);
        assert_eq!(tasks[0].notion_page_id.as_deref(), Some("page-1"));

        let notes = store.load_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].tags, vec!["team"]);
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonStore::new(tmp.path().join("data"));

        let mut settings = Settings::default();
        settings.theme = Theme::Light;
        settings.notion_key = "secret_abc".into();
        store.save_settings(&settings).await.unwrap();

        assert_eq!(store.load_settings().await.unwrap(), settings);
    }
}
