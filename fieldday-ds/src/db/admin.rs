//! Administrative operations: full wipe and statistics rollup

use fieldday_common::db::retry::retry_on_busy;
use fieldday_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// Tables in FK-safe deletion order (children before parents).
const WIPE_ORDER: [&str; 9] = [
    "media_items",
    "stage_records",
    "process_records",
    "summary_data",
    "teacher_evaluations",
    "teacher_evaluations_v2",
    "evaluation_teams",
    "team_divisions",
    "teams",
];

/// Delete every row of every table in one transaction. Returns the per-table
/// deleted counts. The caller gates this behind the admin secret.
pub async fn clear_all(pool: &SqlitePool) -> Result<BTreeMap<String, u64>> {
    let counts = retry_on_busy("clear all data", || async {
        let mut tx = pool.begin().await?;
        let mut counts = BTreeMap::new();

        for table in WIPE_ORDER {
            let result = sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
            counts.insert(table.to_string(), result.rows_affected());
        }

        tx.commit().await?;
        Ok(counts)
    })
    .await?;

    tracing::warn!(?counts, "Cleared all data");
    Ok(counts)
}

/// Aggregate submission statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_teams: i64,
    pub teams_with_process: i64,
    pub teams_with_summary: i64,
    pub average_completion: f64,
    pub total_completed_stages: i64,
    pub total_stages: i64,
}

pub async fn get_statistics(pool: &SqlitePool) -> Result<Statistics> {
    let total_teams: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
        .fetch_one(pool)
        .await?;
    let teams_with_process: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT team_id) FROM process_records")
            .fetch_one(pool)
            .await?;
    let teams_with_summary: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summary_data")
        .fetch_one(pool)
        .await?;
    let (total_stages, total_completed_stages): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_completed = 1 THEN 1 ELSE 0 END), 0) FROM stage_records",
    )
    .fetch_one(pool)
    .await?;

    let average_completion = if total_stages > 0 {
        (total_completed_stages as f64 / total_stages as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    Ok(Statistics {
        total_teams,
        teams_with_process,
        teams_with_summary,
        average_completion,
        total_completed_stages,
        total_stages,
    })
}
