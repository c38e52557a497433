//! Media item reads
//!
//! Stage media are inserted by the subtree writer and summary media by the
//! summary upsert; this module holds the ordered read queries both the
//! assembler and the roster use.

use crate::models::rows::MediaItemRow;
use fieldday_common::Result;
use sqlx::SqlitePool;

/// Media attached to one stage, in capture order.
pub async fn media_for_stage(pool: &SqlitePool, stage_record_id: i64) -> Result<Vec<MediaItemRow>> {
    let media = sqlx::query_as::<_, MediaItemRow>(
        "SELECT * FROM media_items WHERE stage_record_id = ? ORDER BY timestamp",
    )
    .bind(stage_record_id)
    .fetch_all(pool)
    .await?;
    Ok(media)
}

/// Photos attached to one summary question, in capture order.
pub async fn media_for_summary_question(
    pool: &SqlitePool,
    summary_data_id: i64,
    question: i64,
) -> Result<Vec<MediaItemRow>> {
    let media = sqlx::query_as::<_, MediaItemRow>(
        "SELECT * FROM media_items WHERE summary_data_id = ? AND summary_question = ? ORDER BY timestamp",
    )
    .bind(summary_data_id)
    .bind(question)
    .fetch_all(pool)
    .await?;
    Ok(media)
}
