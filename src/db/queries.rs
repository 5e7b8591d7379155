// Database queries — CRUD operations for all tables.
//
// Every database interaction goes through this module. SQL stays in one
// place and the rest of the app gets clean Rust interfaces over the
// models.

use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::classify::QuestionCount;
use crate::corpus::{GroupCorpus, InterviewRecord};
use crate::db::models::{ProjectMeta, ProjectSummary, StoredProject};
use crate::params::{AnalysisParams, ExtractionMethod};
use crate::pipeline::AnalysisResult;
use crate::themes::taxonomy::{Taxonomy, Theme};

// --- Session state ---

pub fn get_session_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM session_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

pub fn set_session_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO session_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

pub fn clear_session_state(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM session_state WHERE key = ?1", params![key])?;
    Ok(())
}

// --- Saving a run ---

/// Persist a complete analysis result as a new project.
///
/// Everything lands in one transaction: the project row, its themes (with
/// taxonomy positions), the source records, and the per-question counts.
/// Returns the new project id and the theme name -> theme id mapping.
pub fn save_analysis(
    conn: &mut Connection,
    name: &str,
    description: &str,
    result: &AnalysisResult,
) -> Result<(i64, HashMap<String, i64>)> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO projects (name, description, min_theme_freq, num_themes, extraction_method)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            name,
            description,
            result.params.min_theme_freq,
            result.params.num_themes,
            result.params.extraction_method.as_str(),
        ],
    )?;
    let project_id = tx.last_insert_rowid();

    let mut theme_ids: HashMap<String, i64> = HashMap::new();
    for (position, theme) in result.taxonomy.themes().iter().enumerate() {
        let keywords_json = serde_json::to_string(&theme.keywords)?;
        tx.execute(
            "INSERT INTO themes (project_id, name, keywords, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![project_id, theme.name, keywords_json, position as i64],
        )?;
        theme_ids.insert(theme.name.clone(), tx.last_insert_rowid());
    }

    for group in &result.groups {
        for record in &group.records {
            tx.execute(
                "INSERT INTO records (project_id, group_name, question, response, respondent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project_id,
                    group.group,
                    record.question,
                    record.response,
                    record.respondent_id,
                ],
            )?;
        }
    }

    for classification in &result.classifications {
        for qc in &classification.question_counts {
            let theme_id = theme_ids
                .get(&qc.theme_name)
                .copied()
                .with_context(|| format!("count references unsaved theme '{}'", qc.theme_name))?;
            tx.execute(
                "INSERT INTO question_counts (project_id, theme_id, group_name, question, count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![project_id, theme_id, qc.group, qc.question_text, qc.count],
            )?;
        }
    }

    tx.commit()?;
    Ok((project_id, theme_ids))
}

// --- Loading ---

/// List saved projects, newest first.
pub fn load_projects(conn: &Connection) -> Result<Vec<ProjectSummary>> {
    let mut stmt =
        conn.prepare("SELECT id, name, created_at FROM projects ORDER BY created_at DESC, id DESC")?;
    let rows = stmt.query_map([], |row| {
        Ok(ProjectSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    })?;

    let mut projects = Vec::new();
    for row in rows {
        projects.push(row?);
    }
    Ok(projects)
}

/// Load one project with its taxonomy, records, and counts.
pub fn load_project(conn: &Connection, id: i64) -> Result<Option<StoredProject>> {
    let meta = {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, min_theme_freq, num_themes, extraction_method, created_at
             FROM projects WHERE id = ?1",
        )?;
        stmt.query_row(params![id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })
        .optional()?
    };
    let Some((id, name, description, min_freq, num_themes, method_str, created_at)) = meta else {
        return Ok(None);
    };

    let method: ExtractionMethod = method_str
        .parse()
        .with_context(|| format!("project {id} has unreadable extraction method"))?;
    let params = AnalysisParams::new(min_freq, num_themes, method)
        .with_context(|| format!("project {id} has out-of-range parameters"))?;

    // Records, grouped by group name in insertion order
    let mut groups: Vec<GroupCorpus> = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT group_name, question, response, respondent_id
             FROM records WHERE project_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        for row in rows {
            let (group_name, question, response, respondent_id) = row?;
            let record = InterviewRecord {
                question,
                response,
                respondent_id,
                group: group_name.clone(),
            };
            if let Some(pos) = groups.iter().position(|g| g.group == group_name) {
                groups[pos].records.push(record);
            } else {
                groups.push(GroupCorpus {
                    group: group_name,
                    records: vec![record],
                });
            }
        }
    }
    let record_count: usize = groups.iter().map(|g| g.len()).sum();

    // Themes in discovery order
    let mut taxonomy = Taxonomy::new(method, record_count as u32);
    {
        let mut stmt = conn.prepare(
            "SELECT id, name, keywords FROM themes WHERE project_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (theme_id, theme_name, keywords_json) = row?;
            let keywords: Vec<String> = serde_json::from_str(&keywords_json)
                .with_context(|| format!("theme '{theme_name}' has unreadable keywords"))?;
            let mut theme = Theme::new(&theme_name, keywords);
            theme.id = Some(theme_id);
            taxonomy.push(theme);
        }
    }

    // Counts joined back to theme names
    let mut counts: Vec<QuestionCount> = Vec::new();
    {
        let mut stmt = conn.prepare(
            "SELECT t.name, qc.group_name, qc.question, qc.count
             FROM question_counts qc
             JOIN themes t ON t.id = qc.theme_id
             WHERE qc.project_id = ?1
             ORDER BY t.position, qc.group_name, qc.question",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok(QuestionCount {
                theme_name: row.get(0)?,
                group: row.get(1)?,
                question_text: row.get(2)?,
                count: row.get(3)?,
            })
        })?;
        for row in rows {
            counts.push(row?);
        }
    }

    Ok(Some(StoredProject {
        meta: ProjectMeta {
            id,
            name,
            description,
            params,
            created_at,
        },
        taxonomy,
        groups,
        counts,
    }))
}

// --- Deleting ---

/// Delete a project and everything hanging off it. Returns false when the
/// project does not exist. The currently-loaded project cannot be
/// deleted; callers must load (or clear) another project first.
pub fn delete_project(conn: &mut Connection, id: i64) -> Result<bool> {
    if get_session_state(conn, "current_project")? == Some(id.to_string()) {
        anyhow::bail!(
            "Project {id} is the current project. Load another project first, then delete this one."
        );
    }

    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM question_counts WHERE project_id = ?1",
        params![id],
    )?;
    tx.execute("DELETE FROM records WHERE project_id = ?1", params![id])?;
    tx.execute("DELETE FROM themes WHERE project_id = ?1", params![id])?;
    let deleted = tx.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
    tx.commit()?;
    Ok(deleted > 0)
}

/// Number of saved projects (for `weft status`).
pub fn project_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_group;
    use crate::db::schema::create_tables;
    use crate::params::ExtractionMethod;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn sample_result() -> AnalysisResult {
        let params = AnalysisParams::new(1, 3, ExtractionMethod::KeywordExtraction).unwrap();
        let mut taxonomy = Taxonomy::new(params.extraction_method, 2);
        taxonomy.push(Theme::new("pricing", vec!["pricing".into(), "cost".into()]));
        taxonomy.push(Theme::new("support", vec!["support".into()]));

        let group = GroupCorpus {
            group: "A".to_string(),
            records: vec![
                InterviewRecord {
                    question: "How is pricing?".to_string(),
                    response: "pricing is steep".to_string(),
                    respondent_id: "r1".to_string(),
                    group: "A".to_string(),
                },
                InterviewRecord {
                    question: "How is support?".to_string(),
                    response: "support is fine".to_string(),
                    respondent_id: "r2".to_string(),
                    group: "A".to_string(),
                },
            ],
        };
        let classification = classify_group(&group, &taxonomy);
        AnalysisResult {
            params,
            taxonomy,
            groups: vec![group],
            classifications: vec![classification],
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let mut conn = test_db();
        let result = sample_result();
        let (id, theme_ids) = save_analysis(&mut conn, "study", "pilot run", &result).unwrap();
        assert!(id > 0);
        assert_eq!(theme_ids.len(), 2);

        let stored = load_project(&conn, id).unwrap().unwrap();
        assert_eq!(stored.meta.name, "study");
        assert_eq!(stored.meta.description, "pilot run");
        assert_eq!(stored.meta.params, result.params);
        assert_eq!(stored.taxonomy.names(), vec!["pricing", "support"]);
        assert_eq!(
            stored.taxonomy.get("pricing").unwrap().keywords,
            vec!["pricing", "cost"]
        );
        assert!(stored.taxonomy.get("pricing").unwrap().id.is_some());
        assert_eq!(stored.groups.len(), 1);
        assert_eq!(stored.groups[0].records.len(), 2);
        assert_eq!(stored.counts.len(), 2);
    }

    #[test]
    fn test_load_missing_project_is_none() {
        let conn = test_db();
        assert!(load_project(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete() {
        let mut conn = test_db();
        let result = sample_result();
        let (first, _) = save_analysis(&mut conn, "first", "", &result).unwrap();
        let (second, _) = save_analysis(&mut conn, "second", "", &result).unwrap();

        let all = load_projects(&conn).unwrap();
        assert_eq!(all.len(), 2);

        assert!(delete_project(&mut conn, first).unwrap());
        let remaining = load_projects(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);

        // Dependent rows went with it
        let orphans: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM themes WHERE project_id = ?1",
                params![first],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);

        // Deleting again reports false
        assert!(!delete_project(&mut conn, first).unwrap());
    }

    #[test]
    fn test_current_project_cannot_be_deleted() {
        let mut conn = test_db();
        let (id, _) = save_analysis(&mut conn, "active", "", &sample_result()).unwrap();
        set_session_state(&conn, "current_project", &id.to_string()).unwrap();

        assert!(delete_project(&mut conn, id).is_err());
        assert!(load_project(&conn, id).unwrap().is_some());

        clear_session_state(&conn, "current_project").unwrap();
        assert!(delete_project(&mut conn, id).unwrap());
    }

    #[test]
    fn test_session_state_roundtrip() {
        let conn = test_db();
        assert_eq!(get_session_state(&conn, "current_project").unwrap(), None);

        set_session_state(&conn, "current_project", "3").unwrap();
        assert_eq!(
            get_session_state(&conn, "current_project").unwrap(),
            Some("3".to_string())
        );

        set_session_state(&conn, "current_project", "5").unwrap();
        assert_eq!(
            get_session_state(&conn, "current_project").unwrap(),
            Some("5".to_string())
        );

        clear_session_state(&conn, "current_project").unwrap();
        assert_eq!(get_session_state(&conn, "current_project").unwrap(), None);
    }

    #[test]
    fn test_project_count() {
        let mut conn = test_db();
        assert_eq!(project_count(&conn).unwrap(), 0);
        save_analysis(&mut conn, "one", "", &sample_result()).unwrap();
        assert_eq!(project_count(&conn).unwrap(), 1);
    }
}
