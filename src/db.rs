//! SQLite task store with Diesel ORM
//!
//! One table of task rows. Each operation checks a connection out of a small r2d2
//! pool, so the reminder poll and foreground commands never share a connection.

use crate::config::Config;
use crate::dates::{self, format_date, is_canonical};
use crate::error::{Result, TaskError};
use crate::model::{Priority, SortKey, Status, Task, TaskChanges, TaskCounts, TaskFilter};
use crate::query;
use crate::schema::tasks;
use chrono::{Duration, NaiveDate};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use std::path::{Path, PathBuf};

/// Environment override for the database location
pub const DB_PATH_ENV: &str = "TM_DB_PATH";

/// Default database file, relative to the working directory
pub const DEFAULT_DB_FILE: &str = "tasks.db";

/// Resolve the database path: explicit flag, then `TM_DB_PATH`, then `./tasks.db`
pub fn resolve_db_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(DEFAULT_DB_FILE)
}

// ============================================================================
// Diesel Models
// ============================================================================

/// Insertable task row
#[derive(Insertable)]
#[diesel(table_name = tasks)]
struct NewTaskRow<'a> {
    description: &'a str,
    due_date: Option<&'a str>,
    priority: &'a str,
    category: &'a str,
    status: &'a str,
    created_at: &'a str,
    updated_at: &'a str,
}

/// Queryable task row, enums still as stored text
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = tasks)]
struct TaskRow {
    id: i32,
    description: String,
    due_date: Option<String>,
    priority: String,
    category: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskError;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Task {
            id: row.id,
            priority: row.priority.parse()?,
            status: row.status.parse()?,
            description: row.description,
            due_date: row.due_date,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_tasks(rows: Vec<TaskRow>) -> Result<Vec<Task>> {
    rows.into_iter().map(Task::try_from).collect()
}

/// Changeset; `None` fields are left untouched
#[derive(AsChangeset)]
#[diesel(table_name = tasks)]
struct TaskChangeset<'a> {
    description: Option<&'a str>,
    due_date: Option<Option<String>>,
    priority: Option<&'a str>,
    category: Option<String>,
    status: Option<&'a str>,
    updated_at: &'a str,
}

/// A fully specified task coming from an import file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTask {
    pub description: String,
    pub due_date: Option<String>,
    pub priority: Priority,
    pub category: String,
    pub status: Status,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

// ============================================================================
// Database Connection
// ============================================================================

type DbPool = Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Wait on a locked database file instead of failing immediately
#[derive(Debug)]
struct BusyTimeout;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for BusyTimeout {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        diesel::sql_query("PRAGMA busy_timeout = 5000")
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Task store backed by a pooled SQLite connection
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    default_priority: Priority,
    default_category: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("default_priority", &self.default_priority)
            .field("default_category", &self.default_category)
            .finish_non_exhaustive()
    }
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

fn clean_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(TaskError::validation("Task description cannot be empty"));
    }
    Ok(trimmed)
}

fn clean_category(category: &str) -> Result<String> {
    let cleaned = category.trim().to_lowercase();
    if cleaned.is_empty() {
        return Err(TaskError::validation("Category cannot be empty"));
    }
    Ok(cleaned)
}

impl Database {
    /// Open the database at `path` with built-in defaults
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, &Config::default())
    }

    /// Open the database at `path`, creating the table if absent
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path_str = path.to_string_lossy().to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(&path_str);
        let pool = Pool::builder()
            .max_size(5)
            .connection_customizer(Box::new(BusyTimeout))
            .build(manager)
            .map_err(|e| TaskError::Connection(e.to_string()))?;

        let db = Self {
            pool,
            default_priority: config.default_priority,
            default_category: config.default_category.clone(),
        };
        db.init_schema()?;
        tracing::debug!(path = %path.display(), "database ready");
        Ok(db)
    }

    fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().map_err(|e| TaskError::Connection(e.to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        let mut conn = self.get_conn()?;

        diesel::sql_query(r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                description TEXT NOT NULL,
                due_date TEXT,
                priority TEXT NOT NULL DEFAULT 'medium',
                category TEXT NOT NULL DEFAULT 'personal',
                status TEXT NOT NULL DEFAULT 'todo',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#).execute(&mut conn)?;

        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status)").execute(&mut conn)?;
        diesel::sql_query("CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date)").execute(&mut conn)?;

        Ok(())
    }

    // ========================================================================
    // Task Operations
    // ========================================================================

    /// Create a task, applying configured defaults for omitted fields
    pub fn create_task(
        &self,
        description: &str,
        due_date: Option<&str>,
        priority: Option<Priority>,
        category: Option<&str>,
    ) -> Result<i32> {
        let description = clean_description(description)?;
        let due = due_date.map(dates::resolve).transpose()?;
        let priority = priority.unwrap_or(self.default_priority);
        let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => clean_category(c)?,
            None => self.default_category.clone(),
        };

        let mut conn = self.get_conn()?;
        let now = now();

        let new_task = NewTaskRow {
            description,
            due_date: due.as_deref(),
            priority: priority.as_str(),
            category: &category,
            status: Status::Todo.as_str(),
            created_at: &now,
            updated_at: &now,
        };

        diesel::insert_into(tasks::table)
            .values(&new_task)
            .execute(&mut conn)?;

        let id: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("last_insert_rowid()"))
            .first(&mut conn)?;

        tracing::debug!(id, "task created");
        Ok(id)
    }

    /// Insert a task exactly as described by an import record
    pub fn insert_imported(&self, record: &ImportedTask) -> Result<i32> {
        let description = clean_description(&record.description)?;
        let category = clean_category(&record.category)?;
        if let Some(ref due) = record.due_date {
            if !is_canonical(due) {
                return Err(TaskError::DateParse { input: due.clone() });
            }
        }

        let mut conn = self.get_conn()?;
        let now = now();
        let created_at = record.created_at.as_deref().unwrap_or(&now);
        let updated_at = record.updated_at.as_deref().unwrap_or(created_at);

        let new_task = NewTaskRow {
            description,
            due_date: record.due_date.as_deref(),
            priority: record.priority.as_str(),
            category: &category,
            status: record.status.as_str(),
            created_at,
            updated_at,
        };

        diesel::insert_into(tasks::table)
            .values(&new_task)
            .execute(&mut conn)?;

        let id: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("last_insert_rowid()"))
            .first(&mut conn)?;

        Ok(id)
    }

    /// Get one task by ID
    pub fn get_task(&self, id: i32) -> Result<Task> {
        let mut conn = self.get_conn()?;
        let row = tasks::table
            .filter(tasks::id.eq(id))
            .select(TaskRow::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(TaskError::NotFound(id))?;
        Task::try_from(row)
    }

    /// List tasks matching `filter` in `sort_by` order. No match is an empty list.
    pub fn list_tasks(&self, filter: &TaskFilter, sort_by: SortKey) -> Result<Vec<Task>> {
        let mut conn = self.get_conn()?;
        let rows = query::build(filter, sort_by)
            .into_boxed()
            .load::<TaskRow>(&mut conn)?;
        into_tasks(rows)
    }

    /// All tasks in insertion order
    pub fn all_tasks(&self) -> Result<Vec<Task>> {
        let mut conn = self.get_conn()?;
        let rows = tasks::table
            .order(tasks::id.asc())
            .select(TaskRow::as_select())
            .load(&mut conn)?;
        into_tasks(rows)
    }

    /// Apply the present fields of `changes` to task `id`
    pub fn update_task(&self, id: i32, changes: &TaskChanges) -> Result<()> {
        if changes.is_empty() {
            return Err(TaskError::NothingToUpdate);
        }

        let description = changes.description.as_deref().map(clean_description).transpose()?;
        let category = changes.category.as_deref().map(clean_category).transpose()?;
        let due_date = match changes.due_date {
            Some(Some(ref text)) => Some(Some(dates::resolve(text)?)),
            Some(None) => Some(None),
            None => None,
        };

        let mut conn = self.get_conn()?;
        let now = now();

        let changeset = TaskChangeset {
            description,
            due_date,
            priority: changes.priority.map(|p| p.as_str()),
            category,
            status: changes.status.map(|s| s.as_str()),
            updated_at: &now,
        };

        let affected = diesel::update(tasks::table.filter(tasks::id.eq(id)))
            .set(&changeset)
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(TaskError::NotFound(id));
        }
        tracing::debug!(id, "task updated");
        Ok(())
    }

    /// Permanently delete task `id`
    pub fn delete_task(&self, id: i32) -> Result<()> {
        let mut conn = self.get_conn()?;
        let affected = diesel::delete(tasks::table.filter(tasks::id.eq(id))).execute(&mut conn)?;
        if affected == 0 {
            return Err(TaskError::NotFound(id));
        }
        tracing::debug!(id, "task deleted");
        Ok(())
    }

    /// Delete the task with the highest ID, returning that ID
    pub fn delete_most_recent(&self) -> Result<i32> {
        let last: Option<i32> = {
            let mut conn = self.get_conn()?;
            tasks::table
                .select(tasks::id)
                .order(tasks::id.desc())
                .first(&mut conn)
                .optional()?
        };
        let id = last.ok_or(TaskError::NoTasks)?;
        self.delete_task(id)?;
        Ok(id)
    }

    /// Case-insensitive substring search over descriptions, newest first
    ///
    /// Matching happens in Rust: SQLite `LIKE` only folds ASCII case.
    pub fn search_tasks(&self, keyword: &str) -> Result<Vec<Task>> {
        let mut conn = self.get_conn()?;
        let rows = tasks::table
            .order(tasks::id.desc())
            .select(TaskRow::as_select())
            .load(&mut conn)?;

        let needle = keyword.to_lowercase();
        let mut found = into_tasks(rows)?;
        found.retain(|t| t.description.to_lowercase().contains(&needle));
        Ok(found)
    }

    /// Open tasks due on `date`, oldest first
    pub fn due_on(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let mut conn = self.get_conn()?;
        let rows = tasks::table
            .filter(tasks::due_date.eq(format_date(date)))
            .filter(tasks::status.ne(Status::Done.as_str()))
            .order(tasks::id.asc())
            .select(TaskRow::as_select())
            .load(&mut conn)?;
        into_tasks(rows)
    }

    /// Open tasks due today
    pub fn due_today(&self) -> Result<Vec<Task>> {
        self.due_on(dates::today())
    }

    /// Totals by status plus the overdue count as of today
    pub fn aggregate_counts(&self) -> Result<TaskCounts> {
        self.aggregate_counts_as_of(dates::today())
    }

    pub fn aggregate_counts_as_of(&self, today: NaiveDate) -> Result<TaskCounts> {
        let mut conn = self.get_conn()?;

        let total: i64 = tasks::table.count().get_result(&mut conn)?;
        let count_status = |conn: &mut DbConn, status: Status| -> Result<i64> {
            Ok(tasks::table
                .filter(tasks::status.eq(status.as_str()))
                .count()
                .get_result(conn)?)
        };
        let done = count_status(&mut conn, Status::Done)?;
        let todo = count_status(&mut conn, Status::Todo)?;
        let in_progress = count_status(&mut conn, Status::InProgress)?;

        let overdue: i64 = tasks::table
            .filter(tasks::due_date.lt(format_date(today)))
            .filter(tasks::status.ne(Status::Done.as_str()))
            .count()
            .get_result(&mut conn)?;

        Ok(TaskCounts { total, done, todo, in_progress, overdue })
    }

    /// Insert a handful of example tasks, returning their IDs
    pub fn seed_samples(&self) -> Result<Vec<i32>> {
        let today = dates::today();
        let in_days = |n: i64| format_date(today + Duration::days(n));
        let samples: [(&str, Option<String>, Priority, &str, Status); 8] = [
            ("Buy groceries for the week", Some(in_days(1)), Priority::High, "personal", Status::Todo),
            ("Finish the programming project", Some(in_days(3)), Priority::Medium, "work", Status::InProgress),
            ("Call the doctor about the appointment", Some(in_days(7)), Priority::Medium, "personal", Status::Todo),
            ("Review the team's code", Some(in_days(0)), Priority::High, "work", Status::Todo),
            ("Plan next week's trip", Some(in_days(14)), Priority::Low, "personal", Status::Todo),
            ("Update CV", None, Priority::Low, "personal", Status::Todo),
            ("Prepare the presentation", Some(in_days(2)), Priority::High, "work", Status::Todo),
            ("Learn a new library", None, Priority::Medium, "learning", Status::Todo),
        ];

        let mut ids = Vec::with_capacity(samples.len());
        for (description, due_date, priority, category, status) in samples {
            ids.push(self.insert_imported(&ImportedTask {
                description: description.to_string(),
                due_date,
                priority,
                category: category.to_string(),
                status,
                created_at: None,
                updated_at: None,
            })?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Database) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open_at(dir.path().join("tasks.db")).expect("Failed to open db");
        (dir, db)
    }

    fn ids(tasks: &[Task]) -> Vec<i32> {
        tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_create_applies_defaults() {
        let (_dir, db) = open_temp();
        let id = db.create_task("Write report", None, None, None).unwrap();

        let all = db.list_tasks(&TaskFilter::default(), SortKey::Id).unwrap();
        assert_eq!(all.len(), 1);
        let task = &all[0];
        assert_eq!(task.id, id);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, "personal");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.due_date, None);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_create_uses_configured_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            default_priority: Priority::High,
            default_category: "work".to_string(),
            ..Config::default()
        };
        let db = Database::open_with_config(dir.path().join("tasks.db"), &config).unwrap();
        let id = db.create_task("Ship it", None, None, Some("  ")).unwrap();
        let task = db.get_task(id).unwrap();
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, "work");
    }

    #[test]
    fn test_create_lowercases_category_and_resolves_due() {
        let (_dir, db) = open_temp();
        let id = db
            .create_task("Dentist", Some("2026-02-03"), Some(Priority::Low), Some("Health"))
            .unwrap();
        let task = db.get_task(id).unwrap();
        assert_eq!(task.category, "health");
        assert_eq!(task.due_date.as_deref(), Some("2026-02-03"));
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn test_create_rejects_empty_description() {
        let (_dir, db) = open_temp();
        let err = db.create_task("   ", None, None, None).unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert!(db.all_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_bad_date_without_writing() {
        let (_dir, db) = open_temp();
        let err = db.create_task("Thing", Some("gibberish!!"), None, None).unwrap_err();
        assert!(matches!(err, TaskError::DateParse { .. }));
        assert!(db.all_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_ids_increase_and_are_not_reused() {
        let (_dir, db) = open_temp();
        let a = db.create_task("a", None, None, None).unwrap();
        let b = db.create_task("b", None, None, None).unwrap();
        assert!(b > a);

        db.delete_task(b).unwrap();
        let c = db.create_task("c", None, None, None).unwrap();
        assert!(c > b, "id {} reused after deleting {}", c, b);
    }

    #[test]
    fn test_update_status_counts_as_done() {
        let (_dir, db) = open_temp();
        let id = db.create_task("Laundry", None, None, None).unwrap();
        let before = db.aggregate_counts().unwrap();

        db.update_task(id, &TaskChanges::status(Status::Done)).unwrap();

        let done = db
            .list_tasks(&TaskFilter { status: Some(Status::Done), ..TaskFilter::default() }, SortKey::Id)
            .unwrap();
        assert_eq!(ids(&done), vec![id]);
        let after = db.aggregate_counts().unwrap();
        assert_eq!(after.done, before.done + 1);
        assert_eq!(after.todo, before.todo - 1);
    }

    #[test]
    fn test_update_keeps_id_and_created_at() {
        let (_dir, db) = open_temp();
        let id = db.create_task("Old text", Some("2026-01-01"), None, None).unwrap();
        let original = db.get_task(id).unwrap();

        let changes = TaskChanges {
            description: Some("New text".to_string()),
            category: Some("Errands".to_string()),
            priority: Some(Priority::High),
            ..TaskChanges::default()
        };
        db.update_task(id, &changes).unwrap();

        let updated = db.get_task(id).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.description, "New text");
        assert_eq!(updated.category, "errands");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.due_date.as_deref(), Some("2026-01-01"));
        assert!(updated.updated_at >= original.updated_at);
    }

    #[test]
    fn test_update_clears_due_date() {
        let (_dir, db) = open_temp();
        let id = db.create_task("Pay rent", Some("2026-07-01"), None, None).unwrap();
        let changes = TaskChanges { due_date: Some(None), ..TaskChanges::default() };
        db.update_task(id, &changes).unwrap();
        assert_eq!(db.get_task(id).unwrap().due_date, None);
    }

    #[test]
    fn test_update_failures() {
        let (_dir, db) = open_temp();
        let id = db.create_task("x", None, None, None).unwrap();

        assert!(matches!(db.update_task(id, &TaskChanges::default()), Err(TaskError::NothingToUpdate)));
        assert!(matches!(
            db.update_task(999, &TaskChanges::status(Status::Done)),
            Err(TaskError::NotFound(999))
        ));

        let bad_date = TaskChanges { due_date: Some(Some("someday maybe".to_string())), ..TaskChanges::default() };
        assert!(matches!(db.update_task(id, &bad_date), Err(TaskError::DateParse { .. })));
        let blank = TaskChanges { description: Some(" ".to_string()), ..TaskChanges::default() };
        assert!(matches!(db.update_task(id, &blank), Err(TaskError::Validation(_))));
        assert_eq!(db.get_task(id).unwrap().description, "x");
    }

    #[test]
    fn test_delete_then_read_is_not_found() {
        let (_dir, db) = open_temp();
        let id = db.create_task("Temp", None, None, None).unwrap();
        let before = db.aggregate_counts().unwrap().total;

        db.delete_task(id).unwrap();

        assert!(matches!(db.get_task(id), Err(TaskError::NotFound(_))));
        assert_eq!(db.aggregate_counts().unwrap().total, before - 1);
        assert!(matches!(db.delete_task(id), Err(TaskError::NotFound(_))));
    }

    #[test]
    fn test_delete_most_recent() {
        let (_dir, db) = open_temp();
        assert!(matches!(db.delete_most_recent(), Err(TaskError::NoTasks)));

        let a = db.create_task("a", None, None, None).unwrap();
        let b = db.create_task("b", None, None, None).unwrap();
        assert_eq!(db.delete_most_recent().unwrap(), b);
        assert_eq!(ids(&db.all_tasks().unwrap()), vec![a]);
    }

    #[test]
    fn test_search_is_case_insensitive_newest_first() {
        let (_dir, db) = open_temp();
        let a = db.create_task("Email the landlord", None, None, None).unwrap();
        db.create_task("Buy milk", None, None, None).unwrap();
        let c = db.create_task("Reply to EMAIL from bank", None, None, None).unwrap();

        assert_eq!(ids(&db.search_tasks("email").unwrap()), vec![c, a]);
        assert!(db.search_tasks("dentist").unwrap().is_empty());
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let (_dir, db) = open_temp();
        db.create_task("Raise to 100%", None, None, None).unwrap();
        db.create_task("Raise to 1000", None, None, None).unwrap();
        assert_eq!(db.search_tasks("0%").unwrap().len(), 1);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let (_dir, db) = open_temp();
        let school = db.create_task("ÉCOLE registration", None, None, None).unwrap();
        let greeting = db.create_task("Привет мир", None, None, None).unwrap();
        db.create_task("Unrelated", None, None, None).unwrap();

        assert_eq!(ids(&db.search_tasks("école").unwrap()), vec![school]);
        assert_eq!(ids(&db.search_tasks("привет").unwrap()), vec![greeting]);
        assert_eq!(ids(&db.search_tasks("МИР").unwrap()), vec![greeting]);
    }

    #[test]
    fn test_sort_by_priority() {
        let (_dir, db) = open_temp();
        let low = db.create_task("low", None, Some(Priority::Low), None).unwrap();
        let high1 = db.create_task("high one", None, Some(Priority::High), None).unwrap();
        let medium = db.create_task("medium", None, Some(Priority::Medium), None).unwrap();
        let high2 = db.create_task("high two", None, Some(Priority::High), None).unwrap();

        let sorted = db.list_tasks(&TaskFilter::default(), SortKey::Priority).unwrap();
        let priorities: Vec<Priority> = sorted.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![Priority::High, Priority::High, Priority::Medium, Priority::Low]);
        assert_eq!(ids(&sorted), vec![high1, high2, medium, low]);
    }

    #[test]
    fn test_sort_by_due_date_puts_missing_last() {
        let (_dir, db) = open_temp();
        let none = db.create_task("no date", None, None, None).unwrap();
        let late = db.create_task("late", Some("2027-05-01"), None, None).unwrap();
        let early = db.create_task("early", Some("2026-05-01"), None, None).unwrap();

        let sorted = db.list_tasks(&TaskFilter::default(), SortKey::DueDate).unwrap();
        assert_eq!(ids(&sorted), vec![early, late, none]);
    }

    #[test]
    fn test_sort_by_id_is_newest_first() {
        let (_dir, db) = open_temp();
        let a = db.create_task("a", None, None, None).unwrap();
        let b = db.create_task("b", None, None, None).unwrap();
        assert_eq!(ids(&db.list_tasks(&TaskFilter::default(), SortKey::Id).unwrap()), vec![b, a]);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let (_dir, db) = open_temp();
        let target = db.create_task("work high", None, Some(Priority::High), Some("work")).unwrap();
        db.create_task("work low", None, Some(Priority::Low), Some("work")).unwrap();
        db.create_task("home high", None, Some(Priority::High), Some("home")).unwrap();

        let filter = TaskFilter {
            priority: Some(Priority::High),
            category: Some("WORK".to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&db.list_tasks(&filter, SortKey::Id).unwrap()), vec![target]);

        let nothing = TaskFilter { status: Some(Status::Done), ..TaskFilter::default() };
        assert!(db.list_tasks(&nothing, SortKey::Id).unwrap().is_empty());
    }

    #[test]
    fn test_overdue_filter_excludes_done() {
        let (_dir, db) = open_temp();
        let yesterday = format_date(dates::today() - Duration::days(1));
        let id = db.create_task("Late task", Some(&yesterday), None, None).unwrap();
        db.create_task("Future task", Some("tomorrow"), None, None).unwrap();
        db.create_task("Undated task", None, None, None).unwrap();

        let overdue = TaskFilter { overdue: true, ..TaskFilter::default() };
        assert_eq!(ids(&db.list_tasks(&overdue, SortKey::DueDate).unwrap()), vec![id]);
        assert_eq!(db.aggregate_counts().unwrap().overdue, 1);

        db.update_task(id, &TaskChanges::status(Status::Done)).unwrap();
        assert!(db.list_tasks(&overdue, SortKey::DueDate).unwrap().is_empty());
        assert_eq!(db.aggregate_counts().unwrap().overdue, 0);
    }

    #[test]
    fn test_due_today_skips_done_and_other_days() {
        let (_dir, db) = open_temp();
        let due = db.create_task("Due now", Some("today"), None, None).unwrap();
        let finished = db.create_task("Already done", Some("today"), None, None).unwrap();
        db.update_task(finished, &TaskChanges::status(Status::Done)).unwrap();
        db.create_task("Later", Some("next week"), None, None).unwrap();

        assert_eq!(ids(&db.due_today().unwrap()), vec![due]);
    }

    #[test]
    fn test_aggregate_counts() {
        let (_dir, db) = open_temp();
        let a = db.create_task("a", None, None, None).unwrap();
        let b = db.create_task("b", None, None, None).unwrap();
        db.create_task("c", Some("2000-01-01"), None, None).unwrap();
        db.update_task(a, &TaskChanges::status(Status::Done)).unwrap();
        db.update_task(b, &TaskChanges::status(Status::InProgress)).unwrap();

        let counts = db.aggregate_counts().unwrap();
        assert_eq!(counts, TaskCounts { total: 3, done: 1, todo: 1, in_progress: 1, overdue: 1 });
    }

    #[test]
    fn test_insert_imported_keeps_fields() {
        let (_dir, db) = open_temp();
        let record = ImportedTask {
            description: "Imported".to_string(),
            due_date: Some("2026-09-09".to_string()),
            priority: Priority::Low,
            category: "archive".to_string(),
            status: Status::Done,
            created_at: Some("2025-01-01T10:00:00+00:00".to_string()),
            updated_at: Some("2025-01-02T10:00:00+00:00".to_string()),
        };
        let id = db.insert_imported(&record).unwrap();
        let task = db.get_task(id).unwrap();
        assert_eq!(task.status, Status::Done);
        assert_eq!(task.created_at, "2025-01-01T10:00:00+00:00");
        assert_eq!(task.updated_at, "2025-01-02T10:00:00+00:00");

        let bad = ImportedTask { due_date: Some("next week".to_string()), ..record };
        assert!(matches!(db.insert_imported(&bad), Err(TaskError::DateParse { .. })));
    }

    #[test]
    fn test_seed_samples() {
        let (_dir, db) = open_temp();
        let ids = db.seed_samples().unwrap();
        assert_eq!(ids.len(), 8);
        assert_eq!(db.aggregate_counts().unwrap().in_progress, 1);
        assert_eq!(db.due_today().unwrap().len(), 1);
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tasks.db");
        let id = {
            let db = Database::open_at(&path).unwrap();
            db.create_task("persist me", None, None, None).unwrap()
        };
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get_task(id).unwrap().description, "persist me");
    }

    #[test]
    fn test_resolve_db_path_prefers_explicit() {
        let explicit = PathBuf::from("/tmp/explicit.db");
        assert_eq!(resolve_db_path(Some(explicit.as_path())), explicit);
    }
}
