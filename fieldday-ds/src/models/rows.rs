//! Storage row types
//!
//! One struct per table, column-for-column. Constructors map a validated wire
//! DTO onto a fresh row (`id` 0 until the upsert assigns one); the reverse
//! mapping lives in `models::view`.

use super::wire::{
    MediaItemWire, ProcessRecordWire, StageRecordWire, SummaryDataWire, TeamDivisionWire,
    TeamInfoWire,
};
use fieldday_common::time::now_ms;
use sqlx::FromRow;

pub const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Clone, FromRow)]
pub struct TeamRow {
    pub id: i64,
    pub team_id: String,
    pub school: String,
    pub grade: String,
    pub class_name: String,
    pub station_id: String,
    pub member_count: i64,
    pub member_names: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

impl TeamRow {
    pub fn from_wire(info: &TeamInfoWire) -> TeamRow {
        let now = now_ms();
        TeamRow {
            id: 0,
            team_id: info.team_id(),
            school: info.school.clone(),
            grade: info.grade.clone(),
            class_name: info.class_name.clone(),
            station_id: info.station_id.clone(),
            member_count: info.member_count,
            member_names: info.member_names.clone(),
            created_at: now,
            updated_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }

    pub fn team_name(&self) -> String {
        format!(
            "{} {} {} {}",
            self.school, self.grade, self.class_name, self.station_id
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TeamDivisionRow {
    pub id: i64,
    pub team_id: String,
    pub group_leader: Option<String>,
    pub group_cooking: Option<String>,
    pub group_soup_rice: Option<String>,
    pub group_fire: Option<String>,
    pub group_health: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

impl TeamDivisionRow {
    pub fn from_wire(team_id: &str, division: &TeamDivisionWire) -> TeamDivisionRow {
        let now = now_ms();
        TeamDivisionRow {
            id: 0,
            team_id: team_id.to_string(),
            group_leader: Some(division.group_leader.clone()),
            group_cooking: Some(division.group_cooking.clone()),
            group_soup_rice: Some(division.group_soup_rice.clone()),
            group_fire: Some(division.group_fire.clone()),
            group_health: Some(division.group_health.clone()),
            created_at: now,
            updated_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProcessRecordRow {
    pub id: i64,
    pub team_id: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub current_stage: Option<String>,
    pub overall_notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

impl ProcessRecordRow {
    pub fn from_wire(team_id: &str, process: &ProcessRecordWire) -> ProcessRecordRow {
        let now = now_ms();
        ProcessRecordRow {
            id: 0,
            team_id: team_id.to_string(),
            start_time: process.start_time,
            end_time: process.end_time,
            current_stage: Some(process.current_stage.clone()),
            overall_notes: Some(process.overall_notes.clone()),
            created_at: now,
            updated_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StageRecordRow {
    pub id: i64,
    pub process_record_id: i64,
    pub stage_name: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub self_rating: i64,
    pub notes: Option<String>,
    pub problem_notes: Option<String>,
    pub is_completed: i64,
    pub selected_tags: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

impl StageRecordRow {
    pub fn from_wire(stage_name: &str, stage: &StageRecordWire) -> StageRecordRow {
        let now = now_ms();
        StageRecordRow {
            id: 0,
            process_record_id: 0,
            stage_name: stage_name.to_string(),
            start_time: stage.start_time,
            end_time: stage.end_time,
            self_rating: stage.self_rating,
            notes: Some(stage.notes.clone()),
            problem_notes: Some(stage.problem_notes.clone()),
            is_completed: if stage.is_completed { 1 } else { 0 },
            selected_tags: Some(
                serde_json::to_string(&stage.selected_tags).unwrap_or_else(|_| "[]".to_string()),
            ),
            created_at: now,
            updated_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }

    /// Stored tag list; a malformed legacy value degrades to empty.
    pub fn tags(&self) -> Vec<String> {
        self.selected_tags
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn completed(&self) -> bool {
        self.is_completed != 0
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MediaItemRow {
    pub id: i64,
    pub stage_record_id: Option<i64>,
    pub summary_data_id: Option<i64>,
    pub summary_question: Option<i64>,
    pub file_path: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub timestamp: i64,
    pub created_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

impl MediaItemRow {
    /// Media row attached to a stage.
    pub fn for_stage(item: &MediaItemWire) -> MediaItemRow {
        let now = now_ms();
        MediaItemRow {
            id: 0,
            stage_record_id: None,
            summary_data_id: None,
            summary_question: None,
            file_path: item.path.clone(),
            file_type: item.media_type.clone(),
            file_size: item.size,
            // Older clients omit capture time; fall back to ingest time
            timestamp: if item.timestamp > 0 { item.timestamp } else { now },
            created_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }

    /// Photo row attached to a summary question (1-3).
    pub fn for_summary_question(question: i64, path: &str) -> MediaItemRow {
        let now = now_ms();
        MediaItemRow {
            id: 0,
            stage_record_id: None,
            summary_data_id: None,
            summary_question: Some(question),
            file_path: path.to_string(),
            file_type: "PHOTO".to_string(),
            file_size: None,
            timestamp: now,
            created_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SummaryDataRow {
    pub id: i64,
    pub team_id: String,
    pub answer1: Option<String>,
    pub answer2: Option<String>,
    pub answer3: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

impl SummaryDataRow {
    pub fn from_wire(team_id: &str, summary: &SummaryDataWire) -> SummaryDataRow {
        let now = now_ms();
        SummaryDataRow {
            id: 0,
            team_id: team_id.to_string(),
            answer1: Some(summary.answer1.clone()),
            answer2: Some(summary.answer2.clone()),
            answer3: Some(summary.answer3.clone()),
            created_at: now,
            updated_at: now,
            schema_version: SCHEMA_VERSION,
            extra_data: None,
        }
    }
}

/// Generation-1 teacher evaluation: one row per `(team, stage)`. Read-only
/// legacy.
#[derive(Debug, Clone, FromRow)]
pub struct TeacherEvaluationRow {
    pub id: i64,
    pub team_id: String,
    pub stage_name: Option<String>,
    pub rating: i64,
    pub comment: Option<String>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
    pub timestamp: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}

/// Generation-2 teacher evaluation: one JSON payload per team.
#[derive(Debug, Clone, FromRow)]
pub struct TeacherEvaluationV2Row {
    pub id: i64,
    pub team_id: String,
    pub payload: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub schema_version: i64,
    pub extra_data: Option<String>,
}
