//! Process record persistence — the nested subtree writer
//!
//! A team's process record owns its stage set, and each stage owns its media
//! set. On every resubmission the whole subtree is replaced: upsert the
//! header, drop the previous stage rows (cascade clears their media), insert
//! the incoming stages and their media fresh. Partial patches are not
//! supported; the client always sends the complete current snapshot.

use crate::models::rows::{MediaItemRow, ProcessRecordRow, StageRecordRow};
use fieldday_common::{time::now_ms, Result};
use sqlx::{SqliteConnection, SqlitePool};

/// One incoming stage and its already-parsed media rows.
#[derive(Debug, Clone)]
pub struct StageDraft {
    pub stage: StageRecordRow,
    pub media: Vec<MediaItemRow>,
}

/// Replace a team's process record subtree. Must run inside the submission
/// transaction. Returns the process record row id.
pub async fn save_process_subtree(
    conn: &mut SqliteConnection,
    header: &ProcessRecordRow,
    stages: &[StageDraft],
) -> Result<i64> {
    let process_record_id = upsert_header(conn, header).await?;

    let mut media_count = 0usize;
    for draft in stages {
        let stage_id = insert_stage(conn, process_record_id, &draft.stage).await?;
        for media in &draft.media {
            insert_stage_media(conn, stage_id, media).await?;
            media_count += 1;
        }
    }

    tracing::info!(
        team_id = %header.team_id,
        stages = stages.len(),
        media = media_count,
        "Replaced process record subtree"
    );
    Ok(process_record_id)
}

/// Upsert the process header; when it pre-existed, delete its old stage rows
/// (media cascade with them).
async fn upsert_header(conn: &mut SqliteConnection, header: &ProcessRecordRow) -> Result<i64> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM process_records WHERE team_id = ?")
            .bind(&header.team_id)
            .fetch_optional(&mut *conn)
            .await?;

    match existing {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE process_records SET
                    start_time = ?, end_time = ?, current_stage = ?, overall_notes = ?,
                    updated_at = ?, schema_version = ?, extra_data = ?
                WHERE team_id = ?
                "#,
            )
            .bind(header.start_time)
            .bind(header.end_time)
            .bind(&header.current_stage)
            .bind(&header.overall_notes)
            .bind(now_ms())
            .bind(header.schema_version)
            .bind(&header.extra_data)
            .bind(&header.team_id)
            .execute(&mut *conn)
            .await?;

            sqlx::query("DELETE FROM stage_records WHERE process_record_id = ?")
                .bind(id)
                .execute(&mut *conn)
                .await?;

            Ok(id)
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO process_records (
                    team_id, start_time, end_time, current_stage, overall_notes,
                    created_at, updated_at, schema_version, extra_data
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&header.team_id)
            .bind(header.start_time)
            .bind(header.end_time)
            .bind(&header.current_stage)
            .bind(&header.overall_notes)
            .bind(header.created_at)
            .bind(header.updated_at)
            .bind(header.schema_version)
            .bind(&header.extra_data)
            .execute(&mut *conn)
            .await?;

            Ok(result.last_insert_rowid())
        }
    }
}

async fn insert_stage(
    conn: &mut SqliteConnection,
    process_record_id: i64,
    stage: &StageRecordRow,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO stage_records (
            process_record_id, stage_name, start_time, end_time,
            self_rating, notes, problem_notes, is_completed, selected_tags,
            created_at, updated_at, schema_version, extra_data
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(process_record_id)
    .bind(&stage.stage_name)
    .bind(stage.start_time)
    .bind(stage.end_time)
    .bind(stage.self_rating)
    .bind(&stage.notes)
    .bind(&stage.problem_notes)
    .bind(stage.is_completed)
    .bind(&stage.selected_tags)
    .bind(stage.created_at)
    .bind(stage.updated_at)
    .bind(stage.schema_version)
    .bind(&stage.extra_data)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn insert_stage_media(
    conn: &mut SqliteConnection,
    stage_record_id: i64,
    media: &MediaItemRow,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO media_items (
            stage_record_id, summary_question, file_path, file_type,
            file_size, timestamp, created_at, schema_version, extra_data
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(stage_record_id)
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

pub async fn get_process_record(
    pool: &SqlitePool,
    team_id: &str,
) -> Result<Option<ProcessRecordRow>> {
    let record =
        sqlx::query_as::<_, ProcessRecordRow>("SELECT * FROM process_records WHERE team_id = ?")
            .bind(team_id)
            .fetch_optional(pool)
            .await?;
    Ok(record)
}

/// Stage rows in the canonical stage sequence, regardless of insertion order.
pub async fn get_stages(
    pool: &SqlitePool,
    process_record_id: i64,
) -> Result<Vec<StageRecordRow>> {
    let sql = format!(
        "SELECT * FROM stage_records WHERE process_record_id = ? ORDER BY {}",
        fieldday_common::stage::order_case_sql()
    );
    let stages = sqlx::query_as::<_, StageRecordRow>(&sql)
        .bind(process_record_id)
        .fetch_all(pool)
        .await?;
    Ok(stages)
}
