//! Read-side assembler
//!
//! Rebuilds the nested team document from normalized rows. Only a missing
//! team row is NotFound; an empty subtree is returned as absent, and any
//! per-subtree reconstruction failure degrades to defaults rather than
//! failing the whole read — a legacy malformed record must not make a team
//! unreadable.

use crate::db::{divisions, media, process, summary, teams};
use crate::engine::evaluation;
use crate::models::view::{ProcessRecordView, StageRecordView, SummaryDataView, TeamDocument};
use fieldday_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::warn;

/// Load the full nested document for one team.
pub async fn get_team_document(pool: &SqlitePool, team_id: &str) -> Result<TeamDocument> {
    let team = teams::get_team(pool, team_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("team {}", team_id)))?;

    let team_division = divisions::get_division(pool, team_id)
        .await
        .unwrap_or_else(|e| {
            warn!(team_id, error = %e, "Failed to load division, omitting");
            None
        })
        .map(|row| row.to_wire())
        .filter(|division| !division.is_empty());

    let process_record = load_process_view(pool, team_id).await;
    let summary_data = load_summary_view(pool, team_id).await;

    let evaluation = evaluation::get_evaluation(pool, team_id)
        .await
        .unwrap_or_else(|e| {
            warn!(team_id, error = %e, "Failed to load evaluation, returning empty");
            Default::default()
        });

    Ok(TeamDocument {
        team_id: team.team_id.clone(),
        team_name: team.team_name(),
        team_info: team.to_wire(),
        team_division,
        process_record,
        summary_data,
        evaluation,
        created_at: team.created_at,
        updated_at: team.updated_at,
    })
}

/// Process record with stages in canonical order and media reattached per
/// stage. Any failure degrades to "no process record".
async fn load_process_view(pool: &SqlitePool, team_id: &str) -> Option<ProcessRecordView> {
    let header = match process::get_process_record(pool, team_id).await {
        Ok(header) => header?,
        Err(e) => {
            warn!(team_id, error = %e, "Failed to load process record, omitting");
            return None;
        }
    };

    let stage_rows = match process::get_stages(pool, header.id).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(team_id, error = %e, "Failed to load stages, returning header only");
            Vec::new()
        }
    };

    let mut stages = Vec::with_capacity(stage_rows.len());
    for row in stage_rows {
        let media = match media::media_for_stage(pool, row.id).await {
            Ok(rows) => rows.iter().map(|m| m.to_view()).collect(),
            Err(e) => {
                warn!(
                    team_id,
                    stage = %row.stage_name,
                    error = %e,
                    "Failed to load stage media, returning stage without media"
                );
                Vec::new()
            }
        };
        stages.push(row.to_view(media));
    }

    Some(header.to_view(stages))
}

async fn load_summary_view(pool: &SqlitePool, team_id: &str) -> Option<SummaryDataView> {
    let row = match summary::get_summary(pool, team_id).await {
        Ok(row) => row?,
        Err(e) => {
            warn!(team_id, error = %e, "Failed to load summary, omitting");
            return None;
        }
    };

    let mut photos: [Vec<String>; 3] = Default::default();
    for (index, slot) in photos.iter_mut().enumerate() {
        let question = index as i64 + 1;
        match media::media_for_summary_question(pool, row.id, question).await {
            Ok(rows) => *slot = rows.into_iter().map(|m| m.file_path).collect(),
            Err(e) => {
                warn!(team_id, question, error = %e, "Failed to load summary photos");
            }
        }
    }

    Some(row.to_view(photos))
}

/// Stage views belonging to a team, already canonically ordered; empty when
/// the team has no process record yet.
pub async fn stage_views_for_team(pool: &SqlitePool, team_id: &str) -> Vec<StageRecordView> {
    match load_process_view(pool, team_id).await {
        Some(view) => view.stages,
        None => Vec::new(),
    }
}
