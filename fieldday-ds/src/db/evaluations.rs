//! Teacher evaluation persistence, both schema generations
//!
//! Generation 1 stored one row per `(team, stage)`; generation 2 stores one
//! JSON payload per team plus a denormalized display-name row. All new writes
//! go to generation 2; generation 1 is only read, for databases written by
//! older deployments.

use crate::models::rows::{TeacherEvaluationRow, TeacherEvaluationV2Row};
use fieldday_common::{time::now_ms, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// Generation-1 rows for a team, in the canonical stage sequence.
pub async fn get_legacy_evaluations(
    pool: &SqlitePool,
    team_id: &str,
) -> Result<Vec<TeacherEvaluationRow>> {
    let sql = format!(
        "SELECT * FROM teacher_evaluations WHERE team_id = ? ORDER BY {}",
        fieldday_common::stage::order_case_sql()
    );
    let rows = sqlx::query_as::<_, TeacherEvaluationRow>(&sql)
        .bind(team_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn get_evaluation_v2(
    pool: &SqlitePool,
    team_id: &str,
) -> Result<Option<TeacherEvaluationV2Row>> {
    let row = sqlx::query_as::<_, TeacherEvaluationV2Row>(
        "SELECT * FROM teacher_evaluations_v2 WHERE team_id = ?",
    )
    .bind(team_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn has_evaluation_v2(pool: &SqlitePool, team_id: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM teacher_evaluations_v2 WHERE team_id = ?)",
    )
    .bind(team_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Insert or update the generation-2 payload for a team. Returns the row id.
pub async fn save_evaluation_v2(
    conn: &mut SqliteConnection,
    team_id: &str,
    payload: &str,
) -> Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM teacher_evaluations_v2 WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(&mut *conn)
            .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE teacher_evaluations_v2 SET payload = ?, updated_at = ? WHERE team_id = ?",
            )
            .bind(payload)
            .bind(now_ms())
            .bind(team_id)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id, "Updated teacher evaluation");
            Ok(id)
        }
        None => {
            let now = now_ms();
            let result = sqlx::query(
                r#"
                INSERT INTO teacher_evaluations_v2 (team_id, payload, created_at, updated_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(team_id)
            .bind(payload)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id, "Inserted teacher evaluation");
            Ok(result.last_insert_rowid())
        }
    }
}

/// Upsert the denormalized `{team_id, team_name}` lookup row maintained
/// alongside every v2 write.
pub async fn save_evaluation_team(
    conn: &mut SqliteConnection,
    team_id: &str,
    team_name: &str,
) -> Result<()> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM evaluation_teams WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(&mut *conn)
            .await?;

    match existing {
        Some(_) => {
            sqlx::query("UPDATE evaluation_teams SET team_name = ?, updated_at = ? WHERE team_id = ?")
                .bind(team_name)
                .bind(now_ms())
                .bind(team_id)
                .execute(&mut *conn)
                .await?;
        }
        None => {
            let now = now_ms();
            sqlx::query(
                "INSERT INTO evaluation_teams (team_id, team_name, created_at, updated_at) VALUES (?, ?, ?, ?)",
            )
            .bind(team_id)
            .bind(team_name)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}
