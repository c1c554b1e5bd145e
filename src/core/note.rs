use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type NoteId = String;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Sentinel tag assigned when a note's content contains no tag markers.
pub const UNTAGGED: &str = "untag";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_archived: bool,
    pub is_pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notion_page_id: Option<String>,
}

impl Note {
    pub fn new(id: NoteId, content: impl Into<String>) -> Self {
        let content = content.into();
        let tags = extract_tags(&content);
        Self {
            id,
            content,
            tags,
            created_at: Utc::now(),
            is_archived: false,
            is_pinned: false,
            notion_page_id: None,
        }
    }
}

/// All `#word` tags in order of appearance, duplicates kept.
/// A note with no markers gets the single sentinel tag.
pub fn extract_tags(content: &str) -> Vec<String> {
    let tags: Vec<String> = TAG_RE
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();
    if tags.is_empty() {
        vec![UNTAGGED.to_string()]
    } else {
        tags
    }
}

/// Content with tag markers removed and whitespace collapsed, for the
/// remote `Name` property. Falls back to the raw content when stripping
/// leaves nothing.
pub fn strip_tag_markers(content: &str) -> String {
    let stripped = TAG_RE.replace_all(content, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        content.to_string()
    } else {
        collapsed
    }
}

/// Field-level update for a note. A `content` change rederives `tags`
/// regardless of any `tags` value supplied alongside it.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_archived: Option<bool>,
    pub is_pinned: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_tags_in_order() {
        assert_eq!(
            extract_tags("call #work about #budget then #work again"),
            vec!["work", "budget", "work"]
        );
    }

    #[test]
    fn untagged_sentinel_when_no_markers() {
        assert_eq!(extract_tags("plain text"), vec![UNTAGGED]);
        assert_eq!(extract_tags(""), vec![UNTAGGED]);
    }

    #[test]
    fn hash_without_word_chars_is_not_a_tag() {
        assert_eq!(extract_tags("issue # 42"), vec![UNTAGGED]);
    }

    #[test]
    fn strips_markers_and_collapses_whitespace() {
        assert_eq!(
            strip_tag_markers("call #work  about   #budget tomorrow"),
            "call about tomorrow"
        );
    }

    #[test]
    fn strip_falls_back_to_raw_content() {
        assert_eq!(strip_tag_markers("#only #tags"), "#only #tags");
    }

    #[test]
    fn new_note_derives_tags() {
        let note = Note::new("1".to_string(), "remember #groceries");
        assert_eq!(note.tags, vec!["groceries"]);
        assert!(!note.is_archived);
        assert!(!note.is_pinned);
    }
}
