use super::note::Note;
use super::task::Task;
use super::temporal::date_rank;

/// Incomplete tasks ordered by priority then date, truncated for the
/// drawer's compact list (which shows 3).
pub fn active_tasks(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut active: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    active.sort_by_key(|t| (t.priority.rank(), date_rank(&t.date)));
    active.truncate(limit);
    active
}

/// Case-insensitive substring search over task text (focus board).
pub fn search_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let query = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| t.text.to_lowercase().contains(&query))
        .collect()
}

/// Filter state of the notes browser.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub query: String,
    pub archived: bool,
    pub tag: Option<String>,
}

/// Notes matching the browser's search text, archive view and selected
/// tag, all combined.
pub fn filter_notes<'a>(notes: &'a [Note], filter: &NoteFilter) -> Vec<&'a Note> {
    let query = filter.query.to_lowercase();
    notes
        .iter()
        .filter(|n| n.content.to_lowercase().contains(&query))
        .filter(|n| n.is_archived == filter.archived)
        .filter(|n| match &filter.tag {
            Some(tag) => n.tags.iter().any(|t| t == tag),
            None => true,
        })
        .collect()
}

/// The first `limit` unarchived notes in canonical (most recent first)
/// order, for the drawer's note strip.
pub fn recent_notes(notes: &[Note], limit: usize) -> Vec<&Note> {
    notes
        .iter()
        .filter(|n| !n.is_archived)
        .take(limit)
        .collect()
}

/// Deduplicated, sorted universe of tags across all notes.
pub fn all_tags(notes: &[Note]) -> Vec<String> {
    let mut tags: Vec<String> = notes.iter().flat_map(|n| n.tags.iter().cloned()).collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Tag suggestions for the draft input: active only while the last
/// whitespace-delimited token starts with `#`, matching the remainder
/// case-insensitively as a substring of any known tag.
pub fn tag_suggestions(notes: &[Note], draft: &str) -> Vec<String> {
    // A trailing space ends the token, which dismisses the suggestions
    // (accepting one appends that space).
    if draft.ends_with(char::is_whitespace) {
        return Vec::new();
    }
    let Some(last_word) = draft.split_whitespace().last() else {
        return Vec::new();
    };
    let Some(partial) = last_word.strip_prefix('#') else {
        return Vec::new();
    };
    let partial = partial.to_lowercase();
    all_tags(notes)
        .into_iter()
        .filter(|t| t.to_lowercase().contains(&partial))
        .collect()
}

/// Accept a suggestion: the partial trailing token is replaced with the
/// chosen tag and a trailing space so typing can continue.
pub fn apply_tag_suggestion(draft: &str, tag: &str) -> String {
    let mut words: Vec<&str> = draft.split_whitespace().collect();
    words.pop();
    let tagged = format!("#{}", tag);
    words.push(&tagged);
    let mut result = words.join(" ");
    result.push(' ');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::{Priority, TaskDate};

    fn task(id: i64, priority: Priority, date: TaskDate, completed: bool) -> Task {
        let mut t = Task::new(id, format!("task {}", id));
        t.priority = priority;
        t.date = date;
        t.completed = completed;
        t
    }

    fn note(id: &str, content: &str) -> Note {
        Note::new(id.to_string(), content)
    }

    #[test]
    fn active_tasks_sorts_by_priority_then_date() {
        let tasks = vec![
            task(1, Priority::P3, TaskDate::NoDate, false),
            task(2, Priority::P1, TaskDate::Today, false),
            task(3, Priority::P2, TaskDate::Tomorrow, false),
            task(4, Priority::P1, TaskDate::NoDate, false),
        ];
        let top: Vec<i64> = active_tasks(&tasks, 3).iter().map(|t| t.id).collect();
        assert_eq!(top, vec![2, 4, 3]);
    }

    #[test]
    fn active_tasks_excludes_completed() {
        let tasks = vec![
            task(1, Priority::P1, TaskDate::Today, true),
            task(2, Priority::P3, TaskDate::NoDate, false),
        ];
        let top: Vec<i64> = active_tasks(&tasks, 3).iter().map(|t| t.id).collect();
        assert_eq!(top, vec![2]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let tasks = vec![task(1, Priority::P2, TaskDate::Today, false)];
        assert_eq!(search_tasks(&tasks, "TASK").len(), 1);
        assert_eq!(search_tasks(&tasks, "missing").len(), 0);
        // Empty query matches everything
        assert_eq!(search_tasks(&tasks, "").len(), 1);
    }

    #[test]
    fn note_filter_combines_query_view_and_tag() {
        let mut notes = vec![
            note("1", "groceries #errands"),
            note("2", "groceries list #home"),
            note("3", "standup notes #work"),
        ];
        notes[1].is_archived = true;

        let filter = NoteFilter {
            query: "groceries".into(),
            archived: false,
            tag: Some("errands".into()),
        };
        let matched: Vec<&str> = filter_notes(&notes, &filter)
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(matched, vec!["1"]);

        let archived = NoteFilter {
            archived: true,
            ..Default::default()
        };
        assert_eq!(filter_notes(&notes, &archived).len(), 1);
    }

    #[test]
    fn recent_notes_skips_archived() {
        let mut notes = vec![note("1", "a"), note("2", "b"), note("3", "c")];
        notes[0].is_archived = true;
        let ids: Vec<&str> = recent_notes(&notes, 2).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn tag_universe_is_deduped_and_sorted() {
        let notes = vec![note("1", "#work #alpha"), note("2", "#work #beta")];
        assert_eq!(all_tags(&notes), vec!["alpha", "beta", "work"]);
    }

    #[test]
    fn suggestions_only_for_trailing_hash_token() {
        let notes = vec![note("1", "#work #weekly"), note("2", "#home")];
        assert_eq!(tag_suggestions(&notes, "buy milk #w"), vec!["weekly", "work"]);
        assert_eq!(tag_suggestions(&notes, "buy milk #W"), vec!["weekly", "work"]);
        assert!(tag_suggestions(&notes, "buy milk").is_empty());
        assert!(tag_suggestions(&notes, "").is_empty());
        assert!(tag_suggestions(&notes, "#zzz").is_empty());
        // A completed (space-terminated) tag no longer suggests
        assert!(tag_suggestions(&notes, "buy milk #work ").is_empty());
    }

    #[test]
    fn accepting_a_suggestion_replaces_the_partial_token() {
        assert_eq!(apply_tag_suggestion("buy milk #w", "work"), "buy milk #work ");
        assert_eq!(apply_tag_suggestion("#h", "home"), "#home ");
    }
}
