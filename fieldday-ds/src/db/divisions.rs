//! Team division persistence (1:1 child of teams)

use crate::models::rows::TeamDivisionRow;
use fieldday_common::{time::now_ms, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// Insert or update a team's role assignments. Returns the row id.
pub async fn save_division(
    conn: &mut SqliteConnection,
    division: &TeamDivisionRow,
) -> Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM team_divisions WHERE team_id = ?")
            .bind(&division.team_id)
            .fetch_optional(&mut *conn)
            .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE team_divisions SET
                    group_leader = ?, group_cooking = ?, group_soup_rice = ?,
                    group_fire = ?, group_health = ?,
                    updated_at = ?, schema_version = ?, extra_data = ?
                WHERE team_id = ?
                "#,
            )
            .bind(&division.group_leader)
            .bind(&division.group_cooking)
            .bind(&division.group_soup_rice)
            .bind(&division.group_fire)
            .bind(&division.group_health)
            .bind(now_ms())
            .bind(division.schema_version)
            .bind(&division.extra_data)
            .bind(&division.team_id)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id = %division.team_id, "Updated team division");
            Ok(id)
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO team_divisions (
                    team_id, group_leader, group_cooking, group_soup_rice,
                    group_fire, group_health,
                    created_at, updated_at, schema_version, extra_data
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&division.team_id)
            .bind(&division.group_leader)
            .bind(&division.group_cooking)
            .bind(&division.group_soup_rice)
            .bind(&division.group_fire)
            .bind(&division.group_health)
            .bind(division.created_at)
            .bind(division.updated_at)
            .bind(division.schema_version)
            .bind(&division.extra_data)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id = %division.team_id, "Inserted team division");
            Ok(result.last_insert_rowid())
        }
    }
}

pub async fn get_division(pool: &SqlitePool, team_id: &str) -> Result<Option<TeamDivisionRow>> {
    let division =
        sqlx::query_as::<_, TeamDivisionRow>("SELECT * FROM team_divisions WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(pool)
            .await?;
    Ok(division)
}
