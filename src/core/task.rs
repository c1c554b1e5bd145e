use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "p1" | "P1" => Some(Self::P1),
            "p2" | "P2" => Some(Self::P2),
            "p3" | "P3" => Some(Self::P3),
            _ => None,
        }
    }

    /// Upper-cased code used for the remote `Priority` select property.
    pub fn as_select(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }

    /// Sort rank: P1 sorts before P2 before P3.
    pub fn rank(&self) -> u8 {
        match self {
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
        }
    }
}

/// A task's date: one of the sentinel states shown in the drawer, or a
/// formatted absolute date picked from the calendar ("10 Mar 26").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskDate {
    Today,
    Tomorrow,
    NoDate,
    Absolute(String),
}

impl TaskDate {
    pub fn as_label(&self) -> &str {
        match self {
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::NoDate => "No Date",
            Self::Absolute(s) => s,
        }
    }

    pub fn from_label(s: &str) -> Self {
        match s {
            "Today" => Self::Today,
            "Tomorrow" => Self::Tomorrow,
            "No Date" => Self::NoDate,
            other => Self::Absolute(other.to_string()),
        }
    }
}

impl From<String> for TaskDate {
    fn from(s: String) -> Self {
        Self::from_label(&s)
    }
}

impl From<TaskDate> for String {
    fn from(d: TaskDate) -> Self {
        d.as_label().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
    pub date: TaskDate,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_page_id: Option<String>,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            priority: Priority::P2,
            date: TaskDate::Today,
            completed: false,
            created_at: Utc::now(),
            notion_page_id: None,
        }
    }
}

/// Field-level update for a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub date: Option<TaskDate>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.priority.is_none()
            && self.date.is_none()
            && self.completed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_label_roundtrip() {
        for label in ["Today", "Tomorrow", "No Date", "10 Mar 26"] {
            assert_eq!(TaskDate::from_label(label).as_label(), label);
        }
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new(1, "Buy milk");
        assert_eq!(task.priority, Priority::P2);
        assert_eq!(task.date, TaskDate::Today);
        assert!(!task.completed);
        assert!(task.notion_page_id.is_none());
    }

    #[test]
    fn serializes_in_stored_shape() {
        let mut task = Task::new(42, "Ship release");
        task.priority = Priority::P1;
        task.date = TaskDate::NoDate;
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "p1");
        assert_eq!(json["date"], "No Date");
        assert!(json["createdAt"].is_string());
        assert!(json.get("notionPageId").is_none());
    }
}
