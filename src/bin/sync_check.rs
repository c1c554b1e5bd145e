use spacebar::storage::{JsonStore, LocalGateway};
use spacebar::sync::notion::NotionClient;
use spacebar::sync::{RemoteGateway, sanitize_database_id};

#[tokio::main]
async fn main() {
    systemd_journal_logger::JournalLog::new()
        .unwrap()
        .with_syslog_identifier("spacebar-sync-check".to_string())
        .install()
        .unwrap();
    log::set_max_level(log::LevelFilter::Info);

    let store = JsonStore::new(JsonStore::default_dir());

    let settings = match store.load_settings().await {
        Ok(s) => s,
        Err(e) => {
            println!("Failed to load settings: {}", e);
            return;
        }
    };
    let tasks = store.load_tasks().await.unwrap_or_default();
    let notes = store.load_notes().await.unwrap_or_default();

    println!("=== Notion vs Local Comparison ===\n");
    println!("Local: {} tasks, {} notes\n", tasks.len(), notes.len());

    if settings.notion_key.is_empty() {
        println!("No Notion integration token configured.");
        return;
    }

    let client = match NotionClient::new() {
        Ok(c) => c,
        Err(e) => {
            println!("Client error: {}", e);
            return;
        }
    };

    for (label, database_id) in [
        ("Tasks", settings.notion_tasks_database_id.as_str()),
        ("Notes", settings.notion_notes_database_id.as_str()),
    ] {
        let db = sanitize_database_id(database_id);
        if db.is_empty() {
            println!("--- {} database: not configured ---", label);
            continue;
        }
        println!("--- {} database: {} ---", label, db);
        match client.test_connection(&settings.notion_key, &db).await {
            Ok(()) => println!("  Connection OK"),
            Err(e) => println!("  Connection failed: {}", e),
        }
    }

    // Entities that never got a linkage id: their first create-sync
    // failed or sync was unconfigured when they were added. There is no
    // automatic backfill, so surface them here.
    let unlinked_tasks: Vec<_> = tasks.iter().filter(|t| t.notion_page_id.is_none()).collect();
    let unlinked_notes: Vec<_> = notes.iter().filter(|n| n.notion_page_id.is_none()).collect();

    if !unlinked_tasks.is_empty() {
        println!("\n  NEVER SYNCED TASKS ({}):", unlinked_tasks.len());
        for task in &unlinked_tasks {
            let status = if task.completed { "done" } else { "open" };
            println!("    [{}] {}", status, task.text);
        }
    }

    if !unlinked_notes.is_empty() {
        println!("\n  NEVER SYNCED NOTES ({}):", unlinked_notes.len());
        for note in &unlinked_notes {
            let preview: String = note.content.chars().take(60).collect();
            println!("    [{}] {}", note.tags.join(","), preview);
        }
    }

    if unlinked_tasks.is_empty() && unlinked_notes.is_empty() {
        println!("\nAll local entities are linked to remote records.");
    }

    println!("\n=== Done ===");
}
