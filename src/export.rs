//! Export tasks to JSON or CSV files

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::db::Database;
use crate::error::Result;
use crate::model::Task;

/// Output format for `export`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// `tasks_export_YYYYMMDD_HHMMSS.<ext>` in the working directory
pub fn default_export_path(format: ExportFormat) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("tasks_export_{}.{}", timestamp, format.extension()))
}

/// Serialize tasks as a pretty JSON array
pub fn tasks_to_json(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Serialize tasks as CSV with a header row of field names
pub fn tasks_to_csv(tasks: &[Task]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for task in tasks {
        writer.serialize(task)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write every task to `path` (or a timestamped default).
///
/// Returns `None` without touching the filesystem when there is nothing to export.
pub fn export_tasks(db: &Database, format: ExportFormat, path: Option<&Path>) -> Result<Option<(PathBuf, usize)>> {
    let tasks = db.all_tasks()?;
    if tasks.is_empty() {
        return Ok(None);
    }

    let path = path.map(Path::to_path_buf).unwrap_or_else(|| default_export_path(format));
    let content = match format {
        ExportFormat::Json => tasks_to_json(&tasks)?,
        ExportFormat::Csv => tasks_to_csv(&tasks)?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), count = tasks.len(), "tasks exported");

    Ok(Some((path, tasks.len())))
}
