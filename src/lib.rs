//! Task Manager - personal task tracking from the terminal
//!
//! Tasks live in a single SQLite table. Each one has a description, an optional due
//! date, a priority, a category and a status.
//!
//! # Fields
//!
//! | Field | Values | Default |
//! |-------|--------|---------|
//! | `priority` | `high`, `medium`, `low` | `medium` (configurable) |
//! | `category` | any lowercase text | `personal` (configurable) |
//! | `status` | `todo`, `in-progress`, `done` | `todo` |
//! | `due_date` | `YYYY-MM-DD` or none | none |
//!
//! # Quick Start
//!
//! ```no_run
//! use task_manager::{Database, SortKey, Status, TaskChanges, TaskFilter};
//!
//! let db = Database::open_at("tasks.db").unwrap();
//!
//! let id = db.create_task("Renew passport", Some("next month"), None, Some("admin")).unwrap();
//! db.update_task(id, &TaskChanges::status(Status::InProgress)).unwrap();
//!
//! let overdue = TaskFilter { overdue: true, ..TaskFilter::default() };
//! for task in db.list_tasks(&overdue, SortKey::DueDate).unwrap() {
//!     println!("{} is overdue", task.description);
//! }
//! ```

pub mod commands;
pub mod config;
pub mod dates;
pub mod db;
pub mod display;
pub mod error;
pub mod export;
pub mod import;
pub mod menu;
pub mod model;
pub mod query;
pub mod reminder;
pub mod report;
pub mod schema;

pub use config::Config;
pub use db::{Database, ImportedTask};
pub use error::{Result, TaskError};
pub use model::{Priority, SortKey, Status, Task, TaskChanges, TaskCounts, TaskFilter};
pub use reminder::{ConsoleSink, DueTasks, ReminderLoop, ReminderSink};
