//! Error taxonomy for task operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    /// Input rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    #[error("Could not understand date '{input}'. Try 'today', 'tomorrow', 'next week' or YYYY-MM-DD")]
    DateParse { input: String },

    #[error("Task with ID {0} not found")]
    NotFound(i32),

    #[error("No valid fields to update")]
    NothingToUpdate,

    #[error("No tasks to delete")]
    NoTasks,

    #[error("{0} is not supported yet")]
    Unsupported(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
