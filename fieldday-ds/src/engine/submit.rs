//! Submission write path
//!
//! Clients resubmit the same logical document many times as their local state
//! evolves; every resubmission collapses onto the same team record. The whole
//! document is written in one transaction so a concurrent reader never sees a
//! new team header with stale stages, and the transaction is the unit the
//! retry layer re-runs under write contention.

use crate::db::process::StageDraft;
use crate::db::{divisions, process, summary, teams};
use crate::models::rows::{
    MediaItemRow, ProcessRecordRow, StageRecordRow, SummaryDataRow, TeamDivisionRow, TeamRow,
};
use crate::models::wire::{MediaItemWire, ProcessRecordWire, StageRecordWire, SubmissionDoc};
use fieldday_common::db::retry::retry_on_busy;
use fieldday_common::{Result, Stage};
use sqlx::SqlitePool;
use tracing::warn;

/// Persist one submission document. Returns the derived team identifier.
///
/// Absent subtrees are left untouched; an all-empty division is treated as
/// "no division" and not stored.
pub async fn submit_document(pool: &SqlitePool, doc: &SubmissionDoc) -> Result<String> {
    let info = doc.require_team_info()?;
    let team_id = info.team_id();

    let team = TeamRow::from_wire(info);
    let division = doc
        .team_division
        .as_ref()
        .filter(|division| !division.is_empty())
        .map(|division| TeamDivisionRow::from_wire(&team_id, division));
    let process = doc
        .process_record
        .as_ref()
        .map(|process| map_process(&team_id, process));
    let summary_data = doc
        .summary_data
        .as_ref()
        .map(|s| (SummaryDataRow::from_wire(&team_id, s), summary_photos(s)));

    retry_on_busy("submit", || async {
        let mut tx = pool.begin().await?;

        teams::save_team(&mut tx, &team).await?;

        if let Some(division) = &division {
            divisions::save_division(&mut tx, division).await?;
        }

        if let Some((header, stages)) = &process {
            process::save_process_subtree(&mut tx, header, stages).await?;
        }

        if let Some((summary_row, photos)) = &summary_data {
            summary::save_summary(&mut tx, summary_row, photos).await?;
        }

        tx.commit().await?;
        Ok(())
    })
    .await?;

    Ok(team_id)
}

/// Map the wire process subtree onto rows. Stage names outside the fixed set
/// are dropped with a warning; malformed media entries are dropped per item.
fn map_process(team_id: &str, process: &ProcessRecordWire) -> (ProcessRecordRow, Vec<StageDraft>) {
    let header = ProcessRecordRow::from_wire(team_id, process);

    let mut drafts = Vec::with_capacity(process.stages.len());
    for (stage_name, stage) in &process.stages {
        let Some(known) = Stage::from_name(stage_name) else {
            warn!(team_id, stage_name = %stage_name, "Dropping stage with unknown name");
            continue;
        };
        drafts.push(StageDraft {
            stage: StageRecordRow::from_wire(known.as_str(), stage),
            media: map_stage_media(team_id, known, stage),
        });
    }

    (header, drafts)
}

/// Parse a stage's media entries individually. One malformed photo must never
/// lose the rest of the submission, so bad entries are logged and skipped.
fn map_stage_media(team_id: &str, stage: Stage, wire: &StageRecordWire) -> Vec<MediaItemRow> {
    let mut media = Vec::with_capacity(wire.media_items.len());

    for (index, value) in wire.media_items.iter().enumerate() {
        match MediaItemWire::parse(value) {
            Some(item) => media.push(MediaItemRow::for_stage(&item)),
            None => warn!(
                team_id,
                stage = stage.as_str(),
                index,
                "Skipping malformed media entry"
            ),
        }
    }

    // Oldest clients sent a bare path list instead of media objects
    if media.is_empty() && !wire.photos.is_empty() {
        for path in wire.photos.iter().filter(|path| !path.trim().is_empty()) {
            let item = MediaItemWire {
                path: path.clone(),
                timestamp: wire.start_time,
                ..Default::default()
            };
            media.push(MediaItemRow::for_stage(&item));
        }
    }

    media
}

fn summary_photos(summary: &crate::models::wire::SummaryDataWire) -> Vec<(i64, Vec<String>)> {
    vec![
        (1, summary.photos1.clone()),
        (2, summary.photos2.clone()),
        (3, summary.photos3.clone()),
    ]
}
