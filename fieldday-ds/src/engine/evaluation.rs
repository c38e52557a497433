//! Evaluation dual-schema reconciler
//!
//! Two storage generations of teacher feedback coexist: legacy per-stage rows
//! and the current one-JSON-payload-per-team row. The generation is resolved
//! exactly once here, at the read boundary; callers only ever see the
//! generation-2 stage map. "No evaluation yet" is a normal state, not an
//! error.

use crate::db::{evaluations, teams};
use crate::models::rows::TeacherEvaluationRow;
use crate::models::wire::StageEvaluationWire;
use fieldday_common::db::retry::retry_on_busy;
use fieldday_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::warn;

/// Stage map in the generation-2 shape.
pub type StageMap = BTreeMap<String, StageEvaluationWire>;

/// Which storage generation a team's evaluation was found in.
enum EvaluationSource {
    V2(StageMap),
    Legacy(Vec<TeacherEvaluationRow>),
    None,
}

/// Load the best evaluation view for a team: generation 2 verbatim when
/// present, else the legacy rows translated into the same shape, else empty.
pub async fn get_evaluation(pool: &SqlitePool, team_id: &str) -> Result<StageMap> {
    match load_source(pool, team_id).await? {
        EvaluationSource::V2(map) => Ok(map),
        EvaluationSource::Legacy(rows) => Ok(synthesize_from_legacy(rows)),
        EvaluationSource::None => Ok(StageMap::new()),
    }
}

async fn load_source(pool: &SqlitePool, team_id: &str) -> Result<EvaluationSource> {
    if let Some(row) = evaluations::get_evaluation_v2(pool, team_id).await? {
        match serde_json::from_str::<StageMap>(&row.payload) {
            Ok(map) => return Ok(EvaluationSource::V2(map)),
            Err(e) => {
                // Degrade like any other malformed legacy record
                warn!(team_id, error = %e, "Malformed evaluation payload, falling back");
            }
        }
    }

    let legacy = evaluations::get_legacy_evaluations(pool, team_id).await?;
    if legacy.is_empty() {
        Ok(EvaluationSource::None)
    } else {
        Ok(EvaluationSource::Legacy(legacy))
    }
}

/// Translate legacy per-stage rows into the generation-2 shape: the
/// comma-joined strengths/improvements strings become tag lists and the free
/// comment becomes `otherComment`.
fn synthesize_from_legacy(rows: Vec<TeacherEvaluationRow>) -> StageMap {
    let mut map = StageMap::new();
    for row in rows {
        let Some(stage_name) = row.stage_name.clone().filter(|name| !name.is_empty()) else {
            continue;
        };
        map.insert(
            stage_name.clone(),
            StageEvaluationWire {
                stage: stage_name,
                positive_tags: split_tags(row.strengths.as_deref().unwrap_or("")),
                improvement_tags: split_tags(row.improvements.as_deref().unwrap_or("")),
                other_comment: row.comment.unwrap_or_default(),
            },
        );
    }
    map
}

/// Split a legacy comma-joined tag string; both ASCII and ideographic commas
/// appear in old data.
fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split([',', '，', '、'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Save an evaluation for a team: generation-2 payload plus the denormalized
/// display-name row, in one retried transaction. The team must exist.
pub async fn save_evaluation(
    pool: &SqlitePool,
    team_id: &str,
    team_name: &str,
    stage_map: &StageMap,
) -> Result<()> {
    if teams::get_team(pool, team_id).await?.is_none() {
        return Err(Error::NotFound(format!("team {}", team_id)));
    }

    let payload = serde_json::to_string(stage_map)
        .map_err(|e| Error::Internal(format!("evaluation payload serialization: {}", e)))?;

    retry_on_busy("save evaluation", || async {
        let mut tx = pool.begin().await?;
        evaluations::save_evaluation_v2(&mut tx, team_id, &payload).await?;
        evaluations::save_evaluation_team(&mut tx, team_id, team_name).await?;
        tx.commit().await?;
        Ok(())
    })
    .await
}
