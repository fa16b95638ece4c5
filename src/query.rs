//! Query building for task listings
//!
//! `build` turns a filter and a sort key into a plain `TaskQuery` value with no I/O.
//! `TaskQuery::into_boxed` translates it into a Diesel query over the tasks table.

use chrono::NaiveDate;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::sqlite::Sqlite;

use crate::dates::{format_date, today};
use crate::model::{Priority, SortKey, Status, TaskFilter};
use crate::schema::tasks;

/// One equality or range test. All predicates of a query are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Priority(Priority),
    Category(String),
    Status(Status),
    /// due_date before `as_of` and status not done
    Overdue { as_of: NaiveDate },
}

/// Row ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    /// Ascending due date, tasks without one last
    DueDateNullsLast,
    /// Ranked high=1, medium=2, low=3
    PriorityRank,
    /// Newest first
    IdDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub predicates: Vec<Predicate>,
    pub ordering: Ordering,
}

/// Build a query relative to today's date.
pub fn build(filter: &TaskFilter, sort_by: SortKey) -> TaskQuery {
    build_as_of(filter, sort_by, today())
}

pub fn build_as_of(filter: &TaskFilter, sort_by: SortKey, as_of: NaiveDate) -> TaskQuery {
    let mut predicates = Vec::new();

    if let Some(p) = filter.priority {
        predicates.push(Predicate::Priority(p));
    }
    if let Some(ref c) = filter.category {
        predicates.push(Predicate::Category(c.trim().to_lowercase()));
    }
    if let Some(s) = filter.status {
        predicates.push(Predicate::Status(s));
    }
    if filter.overdue {
        predicates.push(Predicate::Overdue { as_of });
    }

    let ordering = match sort_by {
        SortKey::DueDate => Ordering::DueDateNullsLast,
        SortKey::Priority => Ordering::PriorityRank,
        SortKey::Id => Ordering::IdDesc,
    };

    TaskQuery { predicates, ordering }
}

/// SQL rank expression kept in step with `Priority::rank`.
fn priority_rank_sql() -> String {
    let arms: Vec<String> = Priority::ALL
        .iter()
        .map(|p| format!("WHEN '{}' THEN {}", p.as_str(), p.rank()))
        .collect();
    format!("CASE priority {} ELSE 4 END", arms.join(" "))
}

impl TaskQuery {
    pub fn into_boxed(self) -> tasks::BoxedQuery<'static, Sqlite> {
        let mut query = tasks::table.into_boxed();

        for predicate in self.predicates {
            query = match predicate {
                Predicate::Priority(p) => query.filter(tasks::priority.eq(p.as_str())),
                Predicate::Category(c) => query.filter(tasks::category.eq(c)),
                Predicate::Status(s) => query.filter(tasks::status.eq(s.as_str())),
                Predicate::Overdue { as_of } => query
                    .filter(tasks::due_date.lt(format_date(as_of)))
                    .filter(tasks::status.ne(Status::Done.as_str())),
            };
        }

        match self.ordering {
            Ordering::DueDateNullsLast => query
                .order(tasks::due_date.is_null().asc())
                .then_order_by(tasks::due_date.asc())
                .then_order_by(tasks::id.asc()),
            Ordering::PriorityRank => query
                .order(sql::<Integer>(&priority_rank_sql()).asc())
                .then_order_by(tasks::id.asc()),
            Ordering::IdDesc => query.order(tasks::id.desc()),
        }
    }
}
