//! Inbound wire documents
//!
//! Client payload shape has evolved over several app generations, so every
//! field outside the team identity block defaults permissively: missing
//! numeric means 0, missing string means empty, missing list means empty,
//! missing subtree means "do not touch that entity this round". Renamed
//! fields from older clients are accepted via serde aliases.

use fieldday_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator joining the four identity fields into the derived team id.
pub const TEAM_ID_SEPARATOR: &str = "_";

/// Full nested submission document.
///
/// Only the team identity block is required; each other subtree is optional
/// and untouched when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmissionDoc {
    pub team_info: Option<TeamInfoWire>,
    pub team_division: Option<TeamDivisionWire>,
    pub process_record: Option<ProcessRecordWire>,
    pub summary_data: Option<SummaryDataWire>,
    pub export_time: i64,
}

impl SubmissionDoc {
    /// Validated team identity block, or the client-input error the HTTP
    /// layer turns into a 400.
    pub fn require_team_info(&self) -> Result<&TeamInfoWire> {
        let info = self
            .team_info
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("submission missing teamInfo".to_string()))?;
        info.validate()?;
        Ok(info)
    }
}

/// Team identity and roster fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamInfoWire {
    pub school: String,
    pub grade: String,
    pub class_name: String,
    /// Free-text physical work location ("3号炉"); older clients send it as
    /// `stoveNumber`.
    #[serde(alias = "stoveNumber")]
    pub station_id: String,
    pub member_count: i64,
    pub member_names: String,
}

impl TeamInfoWire {
    /// Required identity fields must all be present and non-blank; everything
    /// else in the document is optional.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("school", &self.school),
            ("grade", &self.grade),
            ("className", &self.class_name),
            ("stationId", &self.station_id),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "team identity fields missing or blank: {}",
                missing.join(", ")
            )))
        }
    }

    /// Derived team identifier used as the foreign key everywhere.
    pub fn team_id(&self) -> String {
        [
            self.school.as_str(),
            self.grade.as_str(),
            self.class_name.as_str(),
            self.station_id.as_str(),
        ]
        .join(TEAM_ID_SEPARATOR)
    }

    /// Human-readable display name for roster listings.
    pub fn team_name(&self) -> String {
        format!(
            "{} {} {} {}",
            self.school, self.grade, self.class_name, self.station_id
        )
    }
}

/// Role assignments. An all-empty division means "no division" and is not
/// stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamDivisionWire {
    pub group_leader: String,
    pub group_cooking: String,
    pub group_soup_rice: String,
    pub group_fire: String,
    pub group_health: String,
}

impl TeamDivisionWire {
    pub fn is_empty(&self) -> bool {
        [
            &self.group_leader,
            &self.group_cooking,
            &self.group_soup_rice,
            &self.group_fire,
            &self.group_health,
        ]
        .iter()
        .all(|role| role.trim().is_empty())
    }
}

/// Overall activity window plus the per-stage map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessRecordWire {
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub stages: BTreeMap<String, StageRecordWire>,
    pub current_stage: String,
    pub overall_notes: String,
}

impl Default for ProcessRecordWire {
    fn default() -> Self {
        ProcessRecordWire {
            start_time: 0,
            end_time: None,
            stages: BTreeMap::new(),
            current_stage: "PREPARATION".to_string(),
            overall_notes: String::new(),
        }
    }
}

/// One stage of the activity as submitted.
///
/// `media_items` stays as raw JSON values so one malformed entry can be
/// skipped without rejecting its siblings or the stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageRecordWire {
    pub stage: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    /// Legacy plain-path photo list from the oldest clients.
    pub photos: Vec<String>,
    #[serde(alias = "media_items")]
    pub media_items: Vec<serde_json::Value>,
    pub self_rating: i64,
    pub selected_tags: Vec<String>,
    pub notes: String,
    pub problem_notes: String,
    pub is_completed: bool,
}

/// One media entry (photo/video) inside a stage payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaItemWire {
    /// Relative file path; may legitimately still be the client-local path
    /// before the corresponding upload arrives.
    #[serde(alias = "filePath", alias = "file_path")]
    pub path: String,
    #[serde(rename = "type", alias = "fileType")]
    pub media_type: String,
    #[serde(alias = "fileSize")]
    pub size: Option<i64>,
    pub timestamp: i64,
}

impl Default for MediaItemWire {
    fn default() -> Self {
        MediaItemWire {
            path: String::new(),
            media_type: "PHOTO".to_string(),
            size: None,
            timestamp: 0,
        }
    }
}

impl MediaItemWire {
    /// Parse one raw media value. `None` means the entry is malformed and
    /// should be skipped (logged by the caller), never that the stage fails.
    pub fn parse(value: &serde_json::Value) -> Option<MediaItemWire> {
        let item: MediaItemWire = serde_json::from_value(value.clone()).ok()?;
        if item.path.trim().is_empty() {
            return None;
        }
        Some(item)
    }
}

/// Closing-reflection answers; photos arrive keyed by question index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryDataWire {
    pub answer1: String,
    pub answer2: String,
    pub answer3: String,
    pub photos1: Vec<String>,
    pub photos2: Vec<String>,
    pub photos3: Vec<String>,
}

/// Per-stage teacher evaluation content (generation-2 shape, shared by the
/// save request and the read response).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageEvaluationWire {
    pub stage: String,
    pub positive_tags: Vec<String>,
    pub improvement_tags: Vec<String>,
    pub other_comment: String,
}

/// Body of the evaluation save request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveEvaluationRequest {
    pub team_name: String,
    pub evaluations: BTreeMap<String, StageEvaluationWire>,
}
