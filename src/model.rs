//! Task record and the value types that describe, filter and change it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::dates::DATE_FORMAT;
use crate::error::TaskError;

/// How important a task is. Stored lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Sort rank, lower sorts first.
    pub fn rank(&self) -> i32 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(TaskError::validation(format!(
                "Invalid priority '{}'. Use high, medium or low",
                other
            ))),
        }
    }
}

/// Where a task is in its lifecycle. Stored lowercase, `in-progress` hyphenated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "in-progress" | "in_progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(TaskError::validation(format!(
                "Invalid status '{}'. Use todo, in-progress or done",
                other
            ))),
        }
    }
}

/// Ordering for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Earliest due date first, tasks without a due date last
    #[default]
    #[value(name = "due_date", alias = "due-date")]
    DueDate,
    /// High, then medium, then low
    Priority,
    /// Newest first
    Id,
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    pub description: String,
    /// Canonical `YYYY-MM-DD`, `None` when the task has no due date
    pub due_date: Option<String>,
    pub priority: Priority,
    pub category: String,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        let today = today.format(DATE_FORMAT).to_string();
        !self.is_done() && self.due_date.as_deref().is_some_and(|d| d < today.as_str())
    }
}

/// Predicates for `Database::list_tasks`. Set fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub status: Option<Status>,
    pub overdue: bool,
}

/// Field changes for `Database::update_task`. Only present fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub description: Option<String>,
    /// `Some(None)` clears the due date; `Some(Some(text))` resolves `text` first
    pub due_date: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub status: Option<Status>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }

    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Counts behind the `report` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: i64,
    pub done: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub overdue: i64,
}

impl TaskCounts {
    /// Percentage of tasks done, 0 for an empty store.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}
