//! Summary data persistence (1:1 child of teams)
//!
//! The three reflection answers upsert like any singleton child; the
//! summary's photos are media rows keyed by question index and are replaced
//! wholesale on every write, mirroring the stage subtree policy.

use crate::models::rows::{MediaItemRow, SummaryDataRow};
use fieldday_common::{time::now_ms, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// Insert or update a team's summary plus its question photos. Must run
/// inside the submission transaction. Returns the summary row id.
pub async fn save_summary(
    conn: &mut SqliteConnection,
    summary: &SummaryDataRow,
    question_photos: &[(i64, Vec<String>)],
) -> Result<i64> {
    let summary_data_id = upsert_summary_row(conn, summary).await?;

    sqlx::query("DELETE FROM media_items WHERE summary_data_id = ?")
        .bind(summary_data_id)
        .execute(&mut *conn)
        .await?;

    for (question, paths) in question_photos {
        for path in paths {
            let media = MediaItemRow::for_summary_question(*question, path);
            insert_summary_media(conn, summary_data_id, &media).await?;
        }
    }

    Ok(summary_data_id)
}

async fn upsert_summary_row(
    conn: &mut SqliteConnection,
    summary: &SummaryDataRow,
) -> Result<i64> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM summary_data WHERE team_id = ?")
        .bind(&summary.team_id)
        .fetch_optional(&mut *conn)
        .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE summary_data SET
                    answer1 = ?, answer2 = ?, answer3 = ?,
                    updated_at = ?, schema_version = ?, extra_data = ?
                WHERE team_id = ?
                "#,
            )
            .bind(&summary.answer1)
            .bind(&summary.answer2)
            .bind(&summary.answer3)
            .bind(now_ms())
            .bind(summary.schema_version)
            .bind(&summary.extra_data)
            .bind(&summary.team_id)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id = %summary.team_id, "Updated summary data");
            Ok(id)
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO summary_data (
                    team_id, answer1, answer2, answer3,
                    created_at, updated_at, schema_version, extra_data
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&summary.team_id)
            .bind(&summary.answer1)
            .bind(&summary.answer2)
            .bind(&summary.answer3)
            .bind(summary.created_at)
            .bind(summary.updated_at)
            .bind(summary.schema_version)
            .bind(&summary.extra_data)
            .execute(&mut *conn)
            .await?;

            tracing::info!(team_id = %summary.team_id, "Inserted summary data");
            Ok(result.last_insert_rowid())
        }
    }
}

async fn insert_summary_media(
    conn: &mut SqliteConnection,
    summary_data_id: i64,
    media: &MediaItemRow,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO media_items (
            summary_data_id, summary_question, file_path, file_type,
            file_size, timestamp, created_at, schema_version, extra_data
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(summary_data_id)
    .bind(media.summary_question)
    .bind(&media.file_path)
    .bind(&media.file_type)
    .bind(media.file_size)
    .bind(media.timestamp)
    .bind(media.created_at)
    .bind(media.schema_version)
    .bind(&media.extra_data)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_summary(pool: &SqlitePool, team_id: &str) -> Result<Option<SummaryDataRow>> {
    let summary =
        sqlx::query_as::<_, SummaryDataRow>("SELECT * FROM summary_data WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(pool)
            .await?;
    Ok(summary)
}

pub async fn has_summary(pool: &SqlitePool, team_id: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM summary_data WHERE team_id = ?)")
            .bind(team_id)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}
