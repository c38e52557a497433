//! Outbound read-side documents
//!
//! Pure row-to-view mappings; the assembler composes these into the nested
//! document the clients read back. Stages are a list in canonical order, not
//! a map, so the fixed ordering survives JSON serialization.

use super::rows::{
    MediaItemRow, ProcessRecordRow, StageRecordRow, SummaryDataRow, TeamDivisionRow, TeamRow,
};
use super::wire::{StageEvaluationWire, TeamDivisionWire, TeamInfoWire};
use serde::Serialize;
use std::collections::BTreeMap;

/// Full nested team document returned by the read side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDocument {
    pub team_id: String,
    pub team_name: String,
    pub team_info: TeamInfoWire,
    pub team_division: Option<TeamDivisionWire>,
    pub process_record: Option<ProcessRecordView>,
    pub summary_data: Option<SummaryDataView>,
    pub evaluation: BTreeMap<String, StageEvaluationWire>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecordView {
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub current_stage: String,
    pub overall_notes: String,
    /// Canonical stage order, always.
    pub stages: Vec<StageRecordView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecordView {
    pub stage: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub self_rating: i64,
    pub selected_tags: Vec<String>,
    pub notes: String,
    pub problem_notes: String,
    pub is_completed: bool,
    /// Plain paths of the photo-type media, for the oldest client readers.
    pub photos: Vec<String>,
    pub media_items: Vec<MediaItemView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemView {
    pub path: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub file_size: Option<i64>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDataView {
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
    pub photos1: Vec<String>,
    pub photos2: Vec<String>,
    pub photos3: Vec<String>,
}

impl TeamRow {
    pub fn to_wire(&self) -> TeamInfoWire {
        TeamInfoWire {
            school: self.school.clone(),
            grade: self.grade.clone(),
            class_name: self.class_name.clone(),
            station_id: self.station_id.clone(),
            member_count: self.member_count,
            member_names: self.member_names.clone(),
        }
    }
}

impl TeamDivisionRow {
    pub fn to_wire(&self) -> TeamDivisionWire {
        TeamDivisionWire {
            group_leader: self.group_leader.clone().unwrap_or_default(),
            group_cooking: self.group_cooking.clone().unwrap_or_default(),
            group_soup_rice: self.group_soup_rice.clone().unwrap_or_default(),
            group_fire: self.group_fire.clone().unwrap_or_default(),
            group_health: self.group_health.clone().unwrap_or_default(),
        }
    }
}

impl MediaItemRow {
    pub fn to_view(&self) -> MediaItemView {
        MediaItemView {
            path: self.file_path.clone(),
            media_type: self.file_type.clone(),
            file_size: self.file_size,
            timestamp: self.timestamp,
        }
    }
}

impl StageRecordRow {
    pub fn to_view(&self, media: Vec<MediaItemView>) -> StageRecordView {
        StageRecordView {
            stage: self.stage_name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            self_rating: self.self_rating,
            selected_tags: self.tags(),
            notes: self.notes.clone().unwrap_or_default(),
            problem_notes: self.problem_notes.clone().unwrap_or_default(),
            is_completed: self.completed(),
            photos: media
                .iter()
                .filter(|m| m.media_type == "PHOTO")
                .map(|m| m.path.clone())
                .collect(),
            media_items: media,
        }
    }
}

impl ProcessRecordRow {
    pub fn to_view(&self, stages: Vec<StageRecordView>) -> ProcessRecordView {
        ProcessRecordView {
            start_time: self.start_time,
            end_time: self.end_time,
            current_stage: self.current_stage.clone().unwrap_or_default(),
            overall_notes: self.overall_notes.clone().unwrap_or_default(),
            stages,
        }
    }
}

impl SummaryDataRow {
    pub fn to_view(&self, photos: [Vec<String>; 3]) -> SummaryDataView {
        let [photos1, photos2, photos3] = photos;
        SummaryDataView {
            answer1: self.answer1.clone().unwrap_or_default(),
            answer2: self.answer2.clone().unwrap_or_default(),
            answer3: self.answer3.clone().unwrap_or_default(),
            photos1,
            photos2,
            photos3,
        }
    }
}
