use std::cmp;

use anyhow::Context;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::models::WorkSession;
use crate::store::helpers::{parse_datetime, parse_optional_datetime};
use crate::store::Store;

fn row_to_session(row: &Row) -> Result<WorkSession> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(WorkSession {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        task_id: row.get("task_id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

const SESSION_COLUMNS: &str =
    "id, owner_id, task_id, started_at, ended_at, created_at, updated_at";

impl Store {
    /// Insert a new active session, refusing if the owner already has one.
    ///
    /// The existence check and the insert run as one guarded statement on
    /// the serialized store thread, so two concurrent starts cannot both
    /// observe "no active session".
    pub async fn insert_active_session(&self, session: &WorkSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            let task_owner: Option<String> = conn
                .query_row(
                    "SELECT owner_id FROM tasks WHERE id = ?1",
                    params![record.task_id],
                    |row| row.get(0),
                )
                .optional()?;
            match task_owner {
                Some(owner) if owner == record.owner_id => {}
                _ => return Err(Error::not_found("task", record.task_id.clone())),
            }

            let inserted = conn
                .execute(
                    "INSERT INTO sessions (id, owner_id, task_id, started_at, ended_at, created_at, updated_at)
                     SELECT ?1, ?2, ?3, ?4, NULL, ?5, ?6
                     WHERE NOT EXISTS (
                         SELECT 1 FROM sessions WHERE owner_id = ?2 AND ended_at IS NULL
                     )",
                    params![
                        record.id,
                        record.owner_id,
                        record.task_id,
                        record.started_at.to_rfc3339(),
                        record.created_at.to_rfc3339(),
                        record.updated_at.to_rfc3339(),
                    ],
                )
                .with_context(|| "failed to insert session")?;

            if inserted == 0 {
                return Err(Error::Conflict {
                    owner_id: record.owner_id.clone(),
                });
            }
            Ok(())
        })
        .await
    }

    /// Set `ended_at` on the active session with this id.
    ///
    /// A second stop is reported as `AlreadyStopped` and leaves the
    /// recorded end untouched; an unknown id is `NotFound`.
    pub async fn mark_session_ended(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<WorkSession> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let existing = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
                ))?;
                let mut rows = stmt.query(params![session_id])?;
                match rows.next()? {
                    Some(row) => row_to_session(row)?,
                    None => return Err(Error::not_found("session", session_id.clone())),
                }
            };

            if existing.ended_at.is_some() {
                return Err(Error::AlreadyStopped { session_id });
            }

            // Keeps ended_at >= started_at even if the clock skewed back.
            let ended_at = cmp::max(now, existing.started_at);

            conn.execute(
                "UPDATE sessions
                 SET ended_at = ?1,
                     updated_at = ?2
                 WHERE id = ?3 AND ended_at IS NULL",
                params![ended_at.to_rfc3339(), now.to_rfc3339(), session_id],
            )
            .with_context(|| "failed to mark session ended")?;

            Ok(WorkSession {
                ended_at: Some(ended_at),
                updated_at: now,
                ..existing
            })
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<WorkSession> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![session_id])?;
            match rows.next()? {
                Some(row) => row_to_session(row),
                None => Err(Error::not_found("session", session_id.clone())),
            }
        })
        .await
    }

    pub async fn get_active_session(&self, owner_id: &str) -> Result<Option<WorkSession>> {
        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE owner_id = ?1 AND ended_at IS NULL
                 LIMIT 1"
            ))?;
            let mut rows = stmt.query(params![owner_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_session(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn list_sessions_for_task(&self, task_id: &str) -> Result<Vec<WorkSession>> {
        let task_id = task_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE task_id = ?1
                 ORDER BY started_at ASC"
            ))?;
            let mut rows = stmt.query(params![task_id])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Sessions for one owner whose start falls in `[from, to)`.
    pub async fn list_sessions_started_between(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WorkSession>> {
        let owner_id = owner_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE owner_id = ?1 AND started_at >= ?2 AND started_at < ?3
                 ORDER BY started_at ASC"
            ))?;
            let mut rows = stmt.query(params![
                owner_id,
                from.to_rfc3339(),
                to.to_rfc3339()
            ])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }
}
