//! Task completion report

use colored::Colorize;

use crate::db::Database;
use crate::error::Result;
use crate::model::TaskCounts;

/// Plain-text report lines, uncolored
pub fn report_lines(counts: &TaskCounts) -> Vec<String> {
    let mut lines = vec![
        format!("Total tasks: {}", counts.total),
        format!("Completed: {}", counts.done),
        format!("In Progress: {}", counts.in_progress),
        format!("Pending: {}", counts.todo),
        format!("Completion Rate: {:.1}%", counts.completion_rate()),
    ];
    if counts.overdue > 0 {
        lines.push(format!("Overdue tasks: {}", counts.overdue));
    }
    lines
}

/// Print the report for the whole store
pub fn print_report(db: &Database) -> Result<TaskCounts> {
    let counts = db.aggregate_counts()?;

    println!("\n{}", "📊 Task Report".cyan().bold());
    println!("{}", "=".repeat(40));
    for line in report_lines(&counts) {
        if line.starts_with("Overdue") {
            println!("⚠️  {}", line.red());
        } else {
            println!("{}", line);
        }
    }

    Ok(counts)
}
