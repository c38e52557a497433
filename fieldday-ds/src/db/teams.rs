//! Team persistence

use crate::models::rows::TeamRow;
use fieldday_common::{time::now_ms, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// Insert or update a team keyed by its derived `team_id`. Returns the row id.
pub async fn save_team(conn: &mut SqliteConnection, team: &TeamRow) -> Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM teams WHERE team_id = ?")
        .bind(&team.team_id)
        .fetch_optional(&mut *conn)
        .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE teams SET
                    school = ?, grade = ?, class_name = ?, station_id = ?,
                    member_count = ?, member_names = ?,
                    updated_at = ?, schema_version = ?, extra_data = ?
                WHERE team_id = ?
                "#,
            )
            .bind(&team.school)
            .bind(&team.grade)
            .bind(&team.class_name)
            .bind(&team.station_id)
            .bind(team.member_count)
            .bind(&team.member_names)
            .bind(now_ms())
            .bind(team.schema_version)
            .bind(&team.extra_data)
            .bind(&team.team_id)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id = %team.team_id, "Updated team");
            Ok(id)
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO teams (
                    team_id, school, grade, class_name, station_id,
                    member_count, member_names,
                    created_at, updated_at, schema_version, extra_data
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&team.team_id)
            .bind(&team.school)
            .bind(&team.grade)
            .bind(&team.class_name)
            .bind(&team.station_id)
            .bind(team.member_count)
            .bind(&team.member_names)
            .bind(team.created_at)
            .bind(team.updated_at)
            .bind(team.schema_version)
            .bind(&team.extra_data)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id = %team.team_id, "Inserted team");
            Ok(result.last_insert_rowid())
        }
    }
}

pub async fn get_team(pool: &SqlitePool, team_id: &str) -> Result<Option<TeamRow>> {
    let team = sqlx::query_as::<_, TeamRow>("SELECT * FROM teams WHERE team_id = ?")
        .bind(team_id)
        .fetch_optional(pool)
        .await?;
    Ok(team)
}

pub async fn get_all_teams(pool: &SqlitePool) -> Result<Vec<TeamRow>> {
    let teams = sqlx::query_as::<_, TeamRow>(
        "SELECT * FROM teams ORDER BY school, grade, class_name, station_id",
    )
    .fetch_all(pool)
    .await?;
    Ok(teams)
}

pub async fn count_teams(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
