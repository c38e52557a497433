//! Team roster listings
//!
//! Summaries for the teacher-side overview and the paged evaluable-team list.
//! Both sort by the number extracted from the free-text station identifier;
//! teams without a parseable number sort last.

use crate::db::{evaluations, process, summary, teams};
use crate::models::rows::TeamRow;
use crate::pagination::{paginate, PageInfo};
use fieldday_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::warn;

/// Sort key for stations whose identifier carries no number.
pub const STATION_SORT_LAST: i64 = 999;

/// One roster entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: String,
    pub team_name: String,
    pub school: String,
    pub grade: String,
    pub class_name: String,
    pub station_id: String,
    pub member_count: i64,
    pub member_names: String,
    pub submit_time: i64,
    pub has_process_record: bool,
    pub has_summary: bool,
    pub completed_stages: i64,
    pub total_stages: i64,
    /// Self-rating per submitted stage.
    pub stage_ratings: BTreeMap<String, i64>,
    /// Completion flag per submitted stage.
    pub stage_completion: BTreeMap<String, bool>,
}

/// One entry of the paged evaluation roster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluableTeam {
    pub team_id: String,
    pub team_name: String,
    pub station_id: String,
    pub has_evaluation: bool,
}

/// Extract the first run of ASCII digits from the station identifier
/// ("3号炉" → 3). Unparseable identifiers get [`STATION_SORT_LAST`].
pub fn station_sort_key(station_id: &str) -> i64 {
    let digits: String = station_id
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(STATION_SORT_LAST)
}

/// All team summaries, station number ascending, resubmission time as the
/// stable tie-break.
pub async fn list_teams(pool: &SqlitePool) -> Result<Vec<TeamSummary>> {
    let mut rows = teams::get_all_teams(pool).await?;
    rows.sort_by_key(|team| (station_sort_key(&team.station_id), team.updated_at));

    let mut summaries = Vec::with_capacity(rows.len());
    for team in rows {
        summaries.push(summarize_team(pool, team).await);
    }
    Ok(summaries)
}

/// Build one summary; subtree lookups degrade to empty rather than dropping
/// the team from the roster.
async fn summarize_team(pool: &SqlitePool, team: TeamRow) -> TeamSummary {
    let mut has_process_record = false;
    let mut completed_stages = 0;
    let mut total_stages = 0;
    let mut stage_ratings = BTreeMap::new();
    let mut stage_completion = BTreeMap::new();

    match process::get_process_record(pool, &team.team_id).await {
        Ok(Some(header)) => {
            has_process_record = true;
            match process::get_stages(pool, header.id).await {
                Ok(stages) => {
                    total_stages = stages.len() as i64;
                    for stage in stages {
                        if stage.completed() {
                            completed_stages += 1;
                        }
                        stage_ratings.insert(stage.stage_name.clone(), stage.self_rating);
                        stage_completion.insert(stage.stage_name.clone(), stage.completed());
                    }
                }
                Err(e) => {
                    warn!(team_id = %team.team_id, error = %e, "Failed to load stages for summary")
                }
            }
        }
        Ok(None) => {}
        Err(e) => {
            warn!(team_id = %team.team_id, error = %e, "Failed to load process record for summary")
        }
    }

    let has_summary = summary::has_summary(pool, &team.team_id)
        .await
        .unwrap_or(false);

    TeamSummary {
        id: team.team_id.clone(),
        team_name: team.team_name(),
        school: team.school,
        grade: team.grade,
        class_name: team.class_name,
        station_id: team.station_id,
        member_count: team.member_count,
        member_names: team.member_names,
        submit_time: team.updated_at,
        has_process_record,
        has_summary,
        completed_stages,
        total_stages,
        stage_ratings,
        stage_completion,
    }
}

/// One page of the evaluation roster, station number ascending.
pub async fn evaluable_teams(
    pool: &SqlitePool,
    page: i64,
    page_size: i64,
) -> Result<(Vec<EvaluableTeam>, PageInfo)> {
    let mut rows = teams::get_all_teams(pool).await?;
    rows.sort_by_key(|team| (station_sort_key(&team.station_id), team.updated_at));

    let (info, offset) = paginate(rows.len() as i64, page, page_size);

    let mut teams_page = Vec::new();
    for team in rows
        .into_iter()
        .skip(offset as usize)
        .take(info.page_size as usize)
    {
        let has_evaluation = evaluations::has_evaluation_v2(pool, &team.team_id)
            .await
            .unwrap_or(false);
        teams_page.push(EvaluableTeam {
            team_id: team.team_id.clone(),
            team_name: team.team_name(),
            station_id: team.station_id,
            has_evaluation,
        });
    }

    Ok((teams_page, info))
}
