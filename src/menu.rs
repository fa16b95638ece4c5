//! Interactive prompt loop used when `tm` runs without a subcommand
//!
//! Stdin is read on a dedicated thread so a pending read never holds up shutdown.
//! Ctrl-C or end of input leaves the menu after stopping any running reminders.

use std::io::{BufRead, Write};

use colored::Colorize;
use tokio::sync::mpsc;

use crate::commands::{self, DeleteTarget};
use crate::config::Config;
use crate::db::Database;
use crate::error::{Result, TaskError};
use crate::export::ExportFormat;
use crate::model::{Priority, SortKey, Status, TaskChanges, TaskFilter};
use crate::reminder::ReminderLoop;

/// Why the menu is being left early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leave {
    Eof,
    Interrupted,
}

/// Outcome of one menu action that did not complete
enum Step {
    Leave(Leave),
    Failed(TaskError),
}

impl From<Leave> for Step {
    fn from(l: Leave) -> Self {
        Step::Leave(l)
    }
}

impl From<TaskError> for Step {
    fn from(e: TaskError) -> Self {
        Step::Failed(e)
    }
}

struct Prompter {
    lines: mpsc::UnboundedReceiver<String>,
}

impl Prompter {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    /// Print `label` and wait for a trimmed line
    async fn ask(&mut self, label: &str) -> std::result::Result<String, Leave> {
        print!("{}", label);
        let _ = std::io::stdout().flush();

        tokio::select! {
            line = self.lines.recv() => match line {
                Some(line) => Ok(line.trim().to_string()),
                None => Err(Leave::Eof),
            },
            _ = tokio::signal::ctrl_c() => Err(Leave::Interrupted),
        }
    }

    /// Like `ask`, but blank input becomes `None`
    async fn ask_optional(&mut self, label: &str) -> std::result::Result<Option<String>, Leave> {
        let answer = self.ask(label).await?;
        Ok(if answer.is_empty() { None } else { Some(answer) })
    }
}

fn parse_id(text: &str) -> Result<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|_| TaskError::validation(format!("'{}' is not a task ID", text)))
}

fn print_options() {
    println!("\n{}", "What would you like to do?".cyan());
    println!("1. Add task");
    println!("2. List all tasks");
    println!("3. List by priority/category/status/overdue");
    println!("4. Update task");
    println!("5. Delete task");
    println!("6. Search tasks");
    println!("7. Generate report");
    println!("8. Export tasks");
    println!("9. Start reminders");
    println!("0. Exit");
}

/// Run the menu until the user exits
pub async fn run(db: &Database, config: &Config) -> Result<()> {
    let mut prompter = Prompter::spawn();
    let mut reminders = ReminderLoop::console(db.clone(), config.reminder_period());

    println!("\n{}", "📝 Task Manager".cyan().bold());
    println!("{}", "=".repeat(30));

    loop {
        print_options();
        let choice = match prompter.ask(&format!("\n{}", "Choose an option (0-9): ".yellow())).await {
            Ok(choice) => choice,
            Err(leave) => {
                announce(leave);
                break;
            }
        };

        if choice == "0" {
            println!("{}", "Goodbye! 👋".green());
            break;
        }

        match dispatch(&choice, db, &mut prompter, &mut reminders).await {
            Ok(()) => {}
            Err(Step::Leave(leave)) => {
                announce(leave);
                break;
            }
            Err(Step::Failed(e)) => eprintln!("{} {}", "Error:".red(), e),
        }
    }

    if reminders.is_running() {
        reminders.stop().await;
        println!("{}", "Reminder system stopped".yellow());
    }
    Ok(())
}

fn announce(leave: Leave) {
    match leave {
        Leave::Interrupted => println!("\n{}", "Cancelled.".yellow()),
        Leave::Eof => println!(),
    }
}

async fn dispatch(
    choice: &str,
    db: &Database,
    prompter: &mut Prompter,
    reminders: &mut ReminderLoop,
) -> std::result::Result<(), Step> {
    match choice {
        "1" => {
            let description = prompter.ask("Task description: ").await?;
            let due = prompter
                .ask_optional("Due date (optional, e.g., 'tomorrow', '2026-01-20'): ")
                .await?;
            let priority = prompter
                .ask_optional("Priority (high/medium/low): ")
                .await?
                .map(|p| p.parse::<Priority>())
                .transpose()?;
            let category = prompter.ask_optional("Category (work/personal/etc.): ").await?;
            commands::add(db, &description, due.as_deref(), priority, category.as_deref())?;
        }
        "2" => {
            commands::list(db, &TaskFilter::default(), SortKey::DueDate)?;
        }
        "3" => {
            let kind = prompter.ask("Filter by (priority/category/status/overdue): ").await?;
            let mut filter = TaskFilter::default();
            match kind.to_lowercase().as_str() {
                "priority" => filter.priority = Some(prompter.ask("Enter priority: ").await?.parse()?),
                "category" => filter.category = Some(prompter.ask("Enter category: ").await?),
                "status" => filter.status = Some(prompter.ask("Enter status: ").await?.parse()?),
                "overdue" => filter.overdue = true,
                other => return Err(TaskError::validation(format!("Unknown filter '{}'", other)).into()),
            }
            commands::list(db, &filter, SortKey::DueDate)?;
        }
        "4" => {
            let id = parse_id(&prompter.ask("Task ID to update: ").await?)?;
            println!("Leave blank to keep current value:");
            let description = prompter.ask_optional("New description: ").await?;
            let status = prompter.ask_optional("New status (todo/in-progress/done): ").await?;
            let due = prompter.ask_optional("New due date: ").await?;
            let priority = prompter.ask_optional("New priority: ").await?;
            let category = prompter.ask_optional("New category: ").await?;

            let changes = TaskChanges {
                description,
                due_date: due.map(Some),
                priority: priority.map(|p| p.parse::<Priority>()).transpose()?,
                category,
                status: status.map(|s| s.parse::<Status>()).transpose()?,
            };
            commands::update(db, id, &changes)?;
        }
        "5" => {
            let answer = prompter.ask("Task ID to delete (or 'last' for last task): ").await?;
            let target = if answer.eq_ignore_ascii_case("last") {
                DeleteTarget::MostRecent
            } else {
                DeleteTarget::Id(parse_id(&answer)?)
            };
            commands::delete(db, target)?;
        }
        "6" => {
            let keyword = prompter.ask("Search keyword: ").await?;
            commands::search(db, &keyword)?;
        }
        "7" => {
            commands::report(db)?;
        }
        "8" => {
            let format = match prompter.ask("Export format (json/csv): ").await?.to_lowercase().as_str() {
                "" | "json" => ExportFormat::Json,
                "csv" => ExportFormat::Csv,
                other => return Err(TaskError::validation(format!("Unknown export format '{}'", other)).into()),
            };
            let file = prompter.ask_optional("Filename (optional): ").await?;
            commands::export(db, format, file.as_deref().map(std::path::Path::new))?;
        }
        "9" => {
            if reminders.start() {
                println!("{}", "✓ Reminder system started".green());
                println!("Reminders running in background. Choose 0 or press Ctrl+C to stop.");
            } else {
                println!("{}", "Reminders are already running.".yellow());
            }
        }
        _ => println!("{}", "Invalid choice. Try again.".red()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
        assert!(matches!(parse_id("twelve"), Err(TaskError::Validation(_))));
    }
}
