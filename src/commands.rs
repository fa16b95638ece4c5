//! Command handlers shared by the CLI and the interactive menu
//!
//! Each handler runs one store operation and prints the outcome. Errors are
//! returned to the caller, which decides how to surface them.

use std::path::Path;

use colored::Colorize;

use crate::db::Database;
use crate::display::print_tasks;
use crate::error::Result;
use crate::export::{export_tasks, ExportFormat};
use crate::import::import_file;
use crate::model::{Priority, SortKey, TaskChanges, TaskCounts, TaskFilter};
use crate::report::print_report;

/// What `delete` removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Id(i32),
    MostRecent,
}

pub fn add(
    db: &Database,
    description: &str,
    due: Option<&str>,
    priority: Option<Priority>,
    category: Option<&str>,
) -> Result<i32> {
    let id = db.create_task(description, due, priority, category)?;
    println!("{}", format!("✓ Task added with ID {}", id).green());
    Ok(id)
}

pub fn list(db: &Database, filter: &TaskFilter, sort_by: SortKey) -> Result<usize> {
    let tasks = db.list_tasks(filter, sort_by)?;
    if tasks.is_empty() {
        println!("{}", "No tasks found.".yellow());
    } else {
        print_tasks(&tasks);
    }
    Ok(tasks.len())
}

pub fn update(db: &Database, id: i32, changes: &TaskChanges) -> Result<()> {
    db.update_task(id, changes)?;
    println!("{}", format!("✓ Task {} updated successfully.", id).green());
    Ok(())
}

pub fn delete(db: &Database, target: DeleteTarget) -> Result<i32> {
    let id = match target {
        DeleteTarget::Id(id) => {
            db.delete_task(id)?;
            id
        }
        DeleteTarget::MostRecent => db.delete_most_recent()?,
    };
    println!("{}", format!("✓ Task {} deleted.", id).green());
    Ok(id)
}

pub fn search(db: &Database, keyword: &str) -> Result<usize> {
    let tasks = db.search_tasks(keyword)?;
    if tasks.is_empty() {
        println!("{}", format!("No tasks found containing '{}'.", keyword).yellow());
    } else {
        println!("\n{}", format!("Found {} task(s) containing '{}':", tasks.len(), keyword).cyan());
        print_tasks(&tasks);
    }
    Ok(tasks.len())
}

pub fn report(db: &Database) -> Result<TaskCounts> {
    print_report(db)
}

pub fn export(db: &Database, format: ExportFormat, file: Option<&Path>) -> Result<usize> {
    match export_tasks(db, format, file)? {
        Some((path, count)) => {
            println!("{}", format!("✓ {} task(s) exported to {}", count, path.display()).green());
            Ok(count)
        }
        None => {
            println!("{}", "No tasks to export.".yellow());
            Ok(0)
        }
    }
}

pub fn import(db: &Database, file: &Path) -> Result<usize> {
    let result = import_file(db, file)?;
    for (index, reason) in &result.skipped {
        eprintln!("{} record {}: {}", "Skipped".yellow(), index, reason);
    }
    println!(
        "{}",
        format!("✓ Imported {} tasks from {}", result.imported.len(), file.display()).green()
    );
    Ok(result.imported.len())
}

/// Report the database location and optionally add sample tasks
pub fn init(db: &Database, db_path: &Path, sample: bool) -> Result<()> {
    println!("{}", format!("✓ Database ready: {}", db_path.display()).green());
    if sample {
        let ids = db.seed_samples()?;
        println!("{}", format!("✓ Added {} sample tasks", ids.len()).green());
    }
    Ok(())
}
