// Group file loading — CSV rows in, validated interview records out.
//
// The loader is deliberately strict: every group file must carry the
// `question`, `response`, `respondent_id` columns, and every row must have
// non-empty question and response cells after normalization. A validation
// failure anywhere aborts the whole run before extraction starts, so a
// taxonomy is never built from partially-validated data.
//
// The parser handles the usual CSV shape: quoted fields, embedded commas,
// doubled quotes, and both \n and \r\n line endings.

use std::path::Path;

use anyhow::{Context, Result};

use crate::corpus::{normalize, GroupCorpus, InterviewRecord};
use crate::error::AnalysisError;

const REQUIRED_COLUMNS: [&str; 3] = ["question", "response", "respondent_id"];

/// A raw row keyed by position, before validation.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub question: String,
    pub response: String,
    pub respondent_id: String,
}

/// Load one group's CSV file and produce its validated, normalized corpus.
pub fn load_group_file(path: &Path, group: &str) -> Result<GroupCorpus> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read group file {}", path.display()))?;

    let rows = parse_rows(&text, group)?;
    validate(&rows, group)?;
    Ok(preprocess(rows, group))
}

/// Parse CSV text into raw rows, resolving the required columns from the
/// header. Extra columns are ignored.
fn parse_rows(text: &str, group: &str) -> Result<Vec<RawRow>, AnalysisError> {
    let mut lines = split_records(text).into_iter();

    let header = lines.next().ok_or_else(|| AnalysisError::ValidationFailure {
        group: group.to_string(),
        reason: "file is empty (no header row)".to_string(),
    })?;

    let columns: Vec<String> = parse_fields(&header)
        .into_iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let mut indices = [0usize; 3];
    for (slot, required) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = columns
            .iter()
            .position(|c| c == required)
            .ok_or_else(|| AnalysisError::ValidationFailure {
                group: group.to_string(),
                reason: format!("missing required column '{required}'"),
            })?;
    }
    let [q_idx, r_idx, id_idx] = indices;

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_fields(&line);
        let cell = |idx: usize| fields.get(idx).cloned().unwrap_or_default();
        rows.push(RawRow {
            question: cell(q_idx),
            response: cell(r_idx),
            respondent_id: cell(id_idx),
        });
    }
    Ok(rows)
}

/// Check that every row has non-empty question, response and respondent_id.
pub fn validate(rows: &[RawRow], group: &str) -> Result<(), AnalysisError> {
    for (i, row) in rows.iter().enumerate() {
        let line = i + 2; // 1-based, after the header
        if normalize::clean(&row.question).is_empty() {
            return Err(AnalysisError::ValidationFailure {
                group: group.to_string(),
                reason: format!("row {line}: empty question"),
            });
        }
        if normalize::clean(&row.response).is_empty() {
            return Err(AnalysisError::ValidationFailure {
                group: group.to_string(),
                reason: format!("row {line}: empty response"),
            });
        }
        if row.respondent_id.trim().is_empty() {
            return Err(AnalysisError::ValidationFailure {
                group: group.to_string(),
                reason: format!("row {line}: empty respondent_id"),
            });
        }
    }
    Ok(())
}

/// Normalize validated rows into immutable interview records.
pub fn preprocess(rows: Vec<RawRow>, group: &str) -> GroupCorpus {
    let records = rows
        .into_iter()
        .map(|row| InterviewRecord {
            question: normalize::clean(&row.question),
            response: normalize::clean(&row.response),
            respondent_id: row.respondent_id.trim().to_string(),
            group: group.to_string(),
        })
        .collect();
    GroupCorpus {
        group: group.to_string(),
        records,
    }
}

/// Split CSV text into logical records, respecting quoted newlines.
fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            '\n' if !in_quotes => {
                records.push(std::mem::take(&mut current));
            }
            '\r' if !in_quotes => {} // swallow CR; LF closes the record
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        records.push(current);
    }
    records
}

/// Split one CSV record into fields, handling quoting and doubled quotes.
fn parse_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field is a literal quote
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
