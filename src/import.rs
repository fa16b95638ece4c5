//! Import tasks from exported JSON files
//!
//! The file is parsed as a whole first; a file that is not a JSON array aborts the
//! import. Each element is then inserted on its own, so one bad record is reported
//! and skipped without losing the rest.

use std::path::Path;

use serde::Deserialize;

use crate::db::{Database, ImportedTask};
use crate::error::{Result, TaskError};
use crate::model::{Priority, Status};

/// One element of an import file. Only `description` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRecord {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_import_category")]
    pub category: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_import_category() -> String {
    "personal".to_string()
}

impl From<ImportRecord> for ImportedTask {
    fn from(r: ImportRecord) -> Self {
        ImportedTask {
            description: r.description,
            due_date: r.due_date.filter(|d| !d.trim().is_empty()),
            priority: r.priority,
            category: r.category,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Outcome of an import run
#[derive(Debug, Default)]
pub struct ImportResult {
    /// IDs assigned to the imported tasks, in file order
    pub imported: Vec<i32>,
    /// (index in file, reason) for every record that was skipped
    pub skipped: Vec<(usize, String)>,
}

/// Import tasks from `path`, choosing the reader by file extension
pub fn import_file(db: &Database, path: &Path) -> Result<ImportResult> {
    if !path.exists() {
        return Err(TaskError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File {} not found", path.display()),
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let content = std::fs::read_to_string(path)?;
            import_json(db, &content)
        }
        "csv" => Err(TaskError::Unsupported("CSV import (use JSON for now)".to_string())),
        other => Err(TaskError::Unsupported(format!("Importing '.{}' files", other))),
    }
}

/// Import a JSON array of task objects
pub fn import_json(db: &Database, content: &str) -> Result<ImportResult> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut result = ImportResult::default();

    for (index, value) in values.into_iter().enumerate() {
        let outcome = serde_json::from_value::<ImportRecord>(value)
            .map_err(TaskError::from)
            .and_then(|record| db.insert_imported(&record.into()));

        match outcome {
            Ok(id) => result.imported.push(id),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping import record");
                result.skipped.push((index, e.to_string()));
            }
        }
    }

    Ok(result)
}
