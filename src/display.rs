//! Terminal rendering of task tables

use colored::{ColoredString, Colorize};

use crate::model::{Priority, Status, Task};

const DESCRIPTION_WIDTH: usize = 30;

/// Shorten to `max_len` characters, marking the cut with ".."
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", kept)
    }
}

fn priority_cell(priority: Priority) -> ColoredString {
    let cell = format!("{:<8}", priority.as_str());
    match priority {
        Priority::High => cell.red(),
        Priority::Medium => cell.yellow(),
        Priority::Low => cell.green(),
    }
}

fn status_cell(status: Status) -> ColoredString {
    let cell = format!("{:<11}", status.as_str());
    match status {
        Status::Done => cell.green(),
        Status::InProgress => cell.blue(),
        Status::Todo => cell.normal(),
    }
}

/// One table row, without trailing newline
pub fn format_row(task: &Task) -> String {
    format!(
        "{:<4} {:<width$} {:<12} {} {:<12} {}",
        task.id,
        truncate(&task.description, DESCRIPTION_WIDTH),
        task.due_date.as_deref().unwrap_or("No due date"),
        priority_cell(task.priority),
        task.category,
        status_cell(task.status),
        width = DESCRIPTION_WIDTH,
    )
}

pub fn print_tasks(tasks: &[Task]) {
    let header = format!(
        "{:<4} {:<width$} {:<12} {:<8} {:<12} {:<11}",
        "ID",
        "Description",
        "Due",
        "Priority",
        "Category",
        "Status",
        width = DESCRIPTION_WIDTH,
    );
    println!("\n{}", header.cyan());
    println!("{}", "-".repeat(84));
    for task in tasks {
        println!("{}", format_row(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        let long = "a".repeat(40);
        let cut = truncate(&long, 30);
        assert_eq!(cut.chars().count(), 30);
        assert!(cut.ends_with(".."));
    }

    #[test]
    fn test_truncate_multibyte() {
        let text = "اشتري خضار للأسبوع واتصل بالدكتور عشان الموعد";
        assert_eq!(truncate(text, 10).chars().count(), 10);
    }

    #[test]
    fn test_row_contents() {
        colored::control::set_override(false);
        let task = Task {
            id: 3,
            description: "Call mum".to_string(),
            due_date: None,
            priority: Priority::Low,
            category: "family".to_string(),
            status: Status::InProgress,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let row = format_row(&task);
        assert!(row.starts_with("3    Call mum"));
        assert!(row.contains("No due date"));
        assert!(row.contains("low"));
        assert!(row.contains("in-progress"));
    }
}
