use std::collections::BTreeSet;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Row};

use crate::error::{Error, Result};
use crate::models::Habit;
use crate::store::helpers::{day_keys_to_json, parse_datetime, parse_day_keys};
use crate::store::Store;
use crate::streaks::{self, StreakSummary};

fn row_to_habit(row: &Row) -> Result<Habit> {
    let completed_dates: String = row.get("completed_dates")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let current_streak: i64 = row.get("current_streak")?;
    let longest_streak: i64 = row.get("longest_streak")?;
    let total_completed_days: i64 = row.get("total_completed_days")?;

    Ok(Habit {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        completed_dates: parse_day_keys(&completed_dates)?,
        current_streak: current_streak as u32,
        longest_streak: longest_streak as u32,
        total_completed_days: total_completed_days as u32,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

const HABIT_COLUMNS: &str = "id, owner_id, name, completed_dates, current_streak, \
     longest_streak, total_completed_days, created_at, updated_at";

fn load_habit(conn: &rusqlite::Connection, habit_id: &str) -> Result<Habit> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"
    ))?;
    let mut rows = stmt.query(params![habit_id])?;
    match rows.next()? {
        Some(row) => row_to_habit(row),
        None => Err(Error::not_found("habit", habit_id.to_string())),
    }
}

fn write_habit_days(
    conn: &rusqlite::Connection,
    habit_id: &str,
    days: &BTreeSet<NaiveDate>,
    summary: StreakSummary,
    now: DateTime<Utc>,
) -> Result<()> {
    let ordered: Vec<NaiveDate> = days.iter().copied().collect();
    conn.execute(
        "UPDATE habits
         SET completed_dates = ?1,
             current_streak = ?2,
             longest_streak = ?3,
             total_completed_days = ?4,
             updated_at = ?5
         WHERE id = ?6",
        params![
            day_keys_to_json(&ordered)?,
            summary.current_streak as i64,
            summary.longest_streak as i64,
            summary.total_completed_days as i64,
            now.to_rfc3339(),
            habit_id,
        ],
    )
    .with_context(|| "failed to write habit streaks")?;
    Ok(())
}

impl Store {
    pub async fn insert_habit(&self, habit: &Habit) -> Result<()> {
        let record = habit.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO habits (id, owner_id, name, completed_dates, current_streak,
                                     longest_streak, total_completed_days, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.id,
                    record.owner_id,
                    record.name,
                    day_keys_to_json(&record.completed_dates)?,
                    record.current_streak as i64,
                    record.longest_streak as i64,
                    record.total_completed_days as i64,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert habit")?;
            Ok(())
        })
        .await
    }

    pub async fn get_habit(&self, habit_id: &str) -> Result<Habit> {
        let habit_id = habit_id.to_string();
        self.execute(move |conn| load_habit(conn, &habit_id)).await
    }

    /// Add or remove one completion marker and rewrite the derived streak
    /// fields from a full recompute, all in one store closure so no
    /// concurrent marker write can interleave.
    pub async fn apply_habit_marker(
        &self,
        habit_id: &str,
        day: NaiveDate,
        completed: bool,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<StreakSummary> {
        let habit_id = habit_id.to_string();
        self.execute(move |conn| {
            let habit = load_habit(conn, &habit_id)?;

            let mut days: BTreeSet<NaiveDate> = habit.completed_dates.iter().copied().collect();
            if completed {
                days.insert(day);
            } else {
                days.remove(&day);
            }

            let ordered: Vec<NaiveDate> = days.iter().copied().collect();
            let summary = streaks::recompute(&ordered, today);
            write_habit_days(conn, &habit_id, &days, summary, now)?;
            Ok(summary)
        })
        .await
    }

    /// Recompute and persist the derived streak fields without changing
    /// the marker set.
    pub async fn recompute_habit_streaks(
        &self,
        habit_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<StreakSummary> {
        let habit_id = habit_id.to_string();
        self.execute(move |conn| {
            let habit = load_habit(conn, &habit_id)?;
            let days: BTreeSet<NaiveDate> = habit.completed_dates.iter().copied().collect();
            let ordered: Vec<NaiveDate> = days.iter().copied().collect();
            let summary = streaks::recompute(&ordered, today);
            write_habit_days(conn, &habit_id, &days, summary, now)?;
            Ok(summary)
        })
        .await
    }
}
