// System status display — shows DB stats, project count, current project.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::db::ProjectStore;

/// Display system status to the terminal.
pub async fn show(store: &Arc<dyn ProjectStore>, db_display_path: &str) -> Result<()> {
    if !Path::new(db_display_path).exists() {
        println!("Database: not initialized");
        println!("\nRun `weft init` to set up the database.");
        return Ok(());
    }

    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    // Saved projects
    let count = store.project_count().await?;
    if count == 0 {
        println!("Projects: none saved yet");
        println!("  Run `weft process` to analyze group files");
    } else {
        println!("Projects: {count} saved");
    }

    // Current project
    match store.current_project().await? {
        Some(id) => match store.load_project(id).await? {
            Some(project) => {
                println!(
                    "Current project: {} (id {}, {} themes, saved {})",
                    project.meta.name,
                    id,
                    project.taxonomy.len(),
                    project.meta.created_at
                );
            }
            None => {
                println!("Current project: id {id} (no longer exists)");
            }
        },
        None => {
            println!("Current project: none loaded");
            println!("  Run `weft load <id>` to restore a saved project");
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
