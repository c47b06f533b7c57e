use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::error::{Error, Result};
use crate::models::Task;
use crate::store::helpers::{parse_optional_datetime, parse_priority};
use crate::store::Store;

fn row_to_task(row: &Row) -> Result<Task> {
    let due_date: Option<String> = row.get("due_date")?;
    let created_at: Option<String> = row.get("created_at")?;
    let priority: String = row.get("priority")?;
    let completed: i64 = row.get("completed")?;

    Ok(Task {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        due_date: parse_optional_datetime(due_date, "due_date")?,
        completed: completed != 0,
        priority: parse_priority(&priority)?,
        created_at: parse_optional_datetime(created_at, "created_at")?,
    })
}

const TASK_COLUMNS: &str = "id, owner_id, title, due_date, completed, priority, created_at";

impl Store {
    pub async fn insert_task(&self, task: &Task) -> Result<()> {
        let record = task.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO tasks (id, owner_id, title, due_date, completed, priority, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.owner_id,
                    record.title,
                    record.due_date.as_ref().map(|dt| dt.to_rfc3339()),
                    record.completed as i64,
                    record.priority.as_str(),
                    record.created_at.as_ref().map(|dt| dt.to_rfc3339()),
                ],
            )
            .with_context(|| "failed to insert task")?;
            Ok(())
        })
        .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![task_id])?;
            match rows.next()? {
                Some(row) => row_to_task(row),
                None => Err(Error::not_found("task", task_id.clone())),
            }
        })
        .await
    }

    pub async fn list_tasks_for_owner(&self, owner_id: &str) -> Result<Vec<Task>> {
        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE owner_id = ?1
                 ORDER BY created_at ASC"
            ))?;
            let mut rows = stmt.query(params![owner_id])?;
            let mut tasks = Vec::new();
            while let Some(row) = rows.next()? {
                tasks.push(row_to_task(row)?);
            }
            Ok(tasks)
        })
        .await
    }

    pub async fn set_task_completed(&self, task_id: &str, completed: bool) -> Result<()> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE tasks SET completed = ?1 WHERE id = ?2",
                    params![completed as i64, task_id],
                )
                .with_context(|| "failed to update task completion")?;

            if rows_affected == 0 {
                return Err(Error::not_found("task", task_id.clone()));
            }
            Ok(())
        })
        .await
    }

    pub async fn set_task_due_date(
        &self,
        task_id: &str,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE tasks SET due_date = ?1 WHERE id = ?2",
                    params![due_date.as_ref().map(|dt| dt.to_rfc3339()), task_id],
                )
                .with_context(|| "failed to update task due date")?;

            if rows_affected == 0 {
                return Err(Error::not_found("task", task_id.clone()));
            }
            Ok(())
        })
        .await
    }
}
