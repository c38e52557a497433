//! Integration tests for the submission engine
//!
//! Every test drives the engine the way the HTTP layer does: wire documents
//! in, nested documents and roster listings out, over a file-backed SQLite
//! database in a temp directory (file-backed so the pool's connections share
//! one database, which the concurrency test depends on).

use fieldday_common::db::init::init_database;
use fieldday_ds::engine::{document, evaluation, roster, submit};
use fieldday_ds::models::wire::{StageEvaluationWire, SubmissionDoc};
use serde_json::json;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tempfile::TempDir;
use tokio::task::JoinSet;

async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("test.db"))
        .await
        .expect("database init");
    (dir, pool)
}

fn doc(value: serde_json::Value) -> SubmissionDoc {
    serde_json::from_value(value).expect("valid submission document")
}

fn identity(station: &str) -> serde_json::Value {
    json!({
        "school": "PS1",
        "grade": "5",
        "className": "A",
        "stationId": station,
        "memberCount": 4,
        "memberNames": "An, Bo, Chen, Du"
    })
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count query")
}

#[tokio::test]
async fn test_idempotent_resubmission() {
    let (_dir, pool) = test_pool().await;

    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "teamDivision": {"groupLeader": "An", "groupFire": "Bo"},
        "processRecord": {
            "startTime": 1000,
            "stages": {
                "PREPARATION": {"startTime": 1000, "isCompleted": true},
                "FIRE_MAKING": {"startTime": 2000}
            }
        }
    }));

    let first = submit::submit_document(&pool, &submission).await.unwrap();
    let second = submit::submit_document(&pool, &submission).await.unwrap();
    assert_eq!(first, second);

    assert_eq!(count(&pool, "teams").await, 1);
    assert_eq!(count(&pool, "team_divisions").await, 1);
    assert_eq!(count(&pool, "process_records").await, 1);
    assert_eq!(count(&pool, "stage_records").await, 2);
}

#[tokio::test]
async fn test_full_replace_semantics() {
    let (_dir, pool) = test_pool().await;

    let first = doc(json!({
        "teamInfo": identity("3号炉"),
        "processRecord": {
            "stages": {
                "PREPARATION": {
                    "mediaItems": [
                        {"path": "prep_1.jpg", "timestamp": 10},
                        {"path": "prep_2.jpg", "timestamp": 20}
                    ]
                },
                "FIRE_MAKING": {
                    "mediaItems": [{"path": "fire_1.jpg", "timestamp": 30}]
                }
            }
        }
    }));
    submit::submit_document(&pool, &first).await.unwrap();
    assert_eq!(count(&pool, "stage_records").await, 2);
    assert_eq!(count(&pool, "media_items").await, 3);

    let second = doc(json!({
        "teamInfo": identity("3号炉"),
        "processRecord": {
            "stages": {
                "COOKING_RICE": {
                    "mediaItems": [{"path": "rice_1.jpg", "timestamp": 40}]
                }
            }
        }
    }));
    submit::submit_document(&pool, &second).await.unwrap();

    // Exactly the new stage set survives; the old stages' media are gone
    assert_eq!(count(&pool, "stage_records").await, 1);
    assert_eq!(count(&pool, "media_items").await, 1);

    let stages = document::stage_views_for_team(&pool, "PS1_5_A_3号炉").await;
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].stage, "COOKING_RICE");
    assert_eq!(stages[0].media_items[0].path, "rice_1.jpg");
}

#[tokio::test]
async fn test_natural_key_determinism() {
    let (_dir, pool) = test_pool().await;

    let first = doc(json!({"teamInfo": identity("3号炉")}));
    let mut other_fields = identity("3号炉");
    other_fields["memberCount"] = json!(5);
    other_fields["memberNames"] = json!("An, Bo, Chen, Du, Er");
    let second = doc(json!({"teamInfo": other_fields}));

    let id1 = submit::submit_document(&pool, &first).await.unwrap();
    let id2 = submit::submit_document(&pool, &second).await.unwrap();

    assert_eq!(id1, "PS1_5_A_3号炉");
    assert_eq!(id1, id2);
    assert_eq!(count(&pool, "teams").await, 1);

    // The resubmission's fields won
    let team = document::get_team_document(&pool, &id1).await.unwrap();
    assert_eq!(team.team_info.member_count, 5);
}

#[tokio::test]
async fn test_fixed_stage_ordering() {
    let (_dir, pool) = test_pool().await;

    // Alphabetical key order (CLEANING first) differs from the canonical
    // sequence, so this catches any map-order leakage
    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "processRecord": {
            "stages": {
                "CLEANING": {},
                "PREPARATION": {},
                "FIRE_MAKING": {}
            }
        }
    }));
    submit::submit_document(&pool, &submission).await.unwrap();

    let stages = document::stage_views_for_team(&pool, "PS1_5_A_3号炉").await;
    let names: Vec<&str> = stages.iter().map(|s| s.stage.as_str()).collect();
    assert_eq!(names, vec!["PREPARATION", "FIRE_MAKING", "CLEANING"]);
}

#[tokio::test]
async fn test_unknown_stage_dropped() {
    let (_dir, pool) = test_pool().await;

    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "processRecord": {
            "stages": {
                "PREPARATION": {},
                "DISHWASHING": {"isCompleted": true}
            }
        }
    }));
    submit::submit_document(&pool, &submission).await.unwrap();

    assert_eq!(count(&pool, "stage_records").await, 1);
    let stages = document::stage_views_for_team(&pool, "PS1_5_A_3号炉").await;
    assert_eq!(stages[0].stage, "PREPARATION");
}

#[tokio::test]
async fn test_partial_media_tolerance() {
    let (_dir, pool) = test_pool().await;

    // One malformed entry among three; the other two and the stage survive
    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "processRecord": {
            "stages": {
                "PREPARATION": {
                    "isCompleted": true,
                    "mediaItems": [
                        {"path": "ok_1.jpg", "timestamp": 10},
                        42,
                        {"path": "ok_2.jpg", "timestamp": 20}
                    ]
                }
            }
        }
    }));
    submit::submit_document(&pool, &submission).await.unwrap();

    assert_eq!(count(&pool, "stage_records").await, 1);
    assert_eq!(count(&pool, "media_items").await, 2);

    let stages = document::stage_views_for_team(&pool, "PS1_5_A_3号炉").await;
    let paths: Vec<&str> = stages[0]
        .media_items
        .iter()
        .map(|m| m.path.as_str())
        .collect();
    assert_eq!(paths, vec!["ok_1.jpg", "ok_2.jpg"]);
}

#[tokio::test]
async fn test_division_all_empty_not_stored() {
    let (_dir, pool) = test_pool().await;

    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "teamDivision": {"groupLeader": "", "groupFire": "  "}
    }));
    submit::submit_document(&pool, &submission).await.unwrap();

    assert_eq!(count(&pool, "team_divisions").await, 0);
    let team = document::get_team_document(&pool, "PS1_5_A_3号炉")
        .await
        .unwrap();
    assert!(team.team_division.is_none());
}

#[tokio::test]
async fn test_missing_identity_rejected() {
    let (_dir, pool) = test_pool().await;

    let no_info = doc(json!({"exportTime": 1}));
    let err = submit::submit_document(&pool, &no_info).await.unwrap_err();
    assert!(matches!(err, fieldday_common::Error::InvalidInput(_)));

    let blank = doc(json!({"teamInfo": {"school": "PS1", "grade": "", "className": "A"}}));
    let err = submit::submit_document(&pool, &blank).await.unwrap_err();
    assert!(matches!(err, fieldday_common::Error::InvalidInput(_)));

    assert_eq!(count(&pool, "teams").await, 0);
}

#[tokio::test]
async fn test_get_unknown_team_is_not_found() {
    let (_dir, pool) = test_pool().await;

    let err = document::get_team_document(&pool, "nope").await.unwrap_err();
    assert!(matches!(err, fieldday_common::Error::NotFound(_)));
}

#[tokio::test]
async fn test_scenario_minimal_submission() {
    let (_dir, pool) = test_pool().await;

    let submission = doc(json!({"teamInfo": identity("3号炉")}));
    submit::submit_document(&pool, &submission).await.unwrap();

    let teams = roster::list_teams(&pool).await.unwrap();
    assert_eq!(teams.len(), 1);
    let entry = &teams[0];
    assert!(!entry.has_process_record);
    assert!(!entry.has_summary);
    assert_eq!(entry.completed_stages, 0);
    assert_eq!(entry.total_stages, 0);
    assert_eq!(roster::station_sort_key(&entry.station_id), 3);
}

#[tokio::test]
async fn test_scenario_incremental_submission() {
    let (_dir, pool) = test_pool().await;

    submit::submit_document(&pool, &doc(json!({"teamInfo": identity("3号炉")})))
        .await
        .unwrap();

    let update = doc(json!({
        "teamInfo": identity("3号炉"),
        "processRecord": {
            "startTime": 1000,
            "currentStage": "PREPARATION",
            "stages": {
                "PREPARATION": {
                    "startTime": 1000,
                    "isCompleted": true,
                    "selfRating": 4,
                    "mediaItems": [{"path": "prep.jpg", "type": "PHOTO", "timestamp": 1500}]
                }
            }
        }
    }));
    submit::submit_document(&pool, &update).await.unwrap();

    let team = document::get_team_document(&pool, "PS1_5_A_3号炉")
        .await
        .unwrap();
    let process = team.process_record.expect("process record present");
    assert_eq!(process.stages.len(), 1);
    assert_eq!(process.stages[0].self_rating, 4);
    assert!(process.stages[0].is_completed);
    assert_eq!(process.stages[0].media_items.len(), 1);

    let teams = roster::list_teams(&pool).await.unwrap();
    assert_eq!(teams[0].completed_stages, 1);
    assert_eq!(teams[0].stage_ratings["PREPARATION"], 4);
}

#[tokio::test]
async fn test_summary_round_trip() {
    let (_dir, pool) = test_pool().await;

    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "summaryData": {
            "answer1": "We learned to share the work.",
            "answer2": "The fire took three tries.",
            "answer3": "",
            "photos1": ["sum_a.jpg", "sum_b.jpg"],
            "photos3": ["sum_c.jpg"]
        }
    }));
    submit::submit_document(&pool, &submission).await.unwrap();

    let team = document::get_team_document(&pool, "PS1_5_A_3号炉")
        .await
        .unwrap();
    let summary = team.summary_data.expect("summary present");
    assert_eq!(summary.answer1, "We learned to share the work.");
    assert_eq!(summary.photos1, vec!["sum_a.jpg", "sum_b.jpg"]);
    assert!(summary.photos2.is_empty());
    assert_eq!(summary.photos3, vec!["sum_c.jpg"]);

    // Resubmission replaces the photo set, not appends
    submit::submit_document(&pool, &submission).await.unwrap();
    assert_eq!(count(&pool, "summary_data").await, 1);
    assert_eq!(count(&pool, "media_items").await, 3);
}

fn stage_map(entries: &[(&str, &[&str], &[&str], &str)]) -> BTreeMap<String, StageEvaluationWire> {
    entries
        .iter()
        .map(|(stage, positive, improvement, comment)| {
            (
                stage.to_string(),
                StageEvaluationWire {
                    stage: stage.to_string(),
                    positive_tags: positive.iter().map(|t| t.to_string()).collect(),
                    improvement_tags: improvement.iter().map(|t| t.to_string()).collect(),
                    other_comment: comment.to_string(),
                },
            )
        })
        .collect()
}

#[tokio::test]
async fn test_evaluation_precedence_v2_wins() {
    let (_dir, pool) = test_pool().await;
    submit::submit_document(&pool, &doc(json!({"teamInfo": identity("3号炉")})))
        .await
        .unwrap();
    let team_id = "PS1_5_A_3号炉";

    let map = stage_map(&[("PREPARATION", &["quick"], &[], "good start")]);
    evaluation::save_evaluation(&pool, team_id, "PS1 5 A 3号炉", &map)
        .await
        .unwrap();

    // A generation-1 row that is *newer* by timestamp must still lose
    sqlx::query(
        r#"
        INSERT INTO teacher_evaluations
            (team_id, stage_name, rating, comment, strengths, improvements,
             timestamp, created_at, updated_at)
        VALUES (?, 'PREPARATION', 2, 'legacy comment', 'slow', 'speed', ?, ?, ?)
        "#,
    )
    .bind(team_id)
    .bind(i64::MAX)
    .bind(i64::MAX)
    .bind(i64::MAX)
    .execute(&pool)
    .await
    .unwrap();

    let read = evaluation::get_evaluation(&pool, team_id).await.unwrap();
    assert_eq!(read, map);
    assert_eq!(read["PREPARATION"].other_comment, "good start");
}

#[tokio::test]
async fn test_legacy_evaluation_synthesized() {
    let (_dir, pool) = test_pool().await;
    submit::submit_document(&pool, &doc(json!({"teamInfo": identity("3号炉")})))
        .await
        .unwrap();
    let team_id = "PS1_5_A_3号炉";

    for (stage, strengths, improvements, comment) in [
        ("FIRE_MAKING", "patient, safe", "kindling prep", "took three tries"),
        ("PREPARATION", "quick, tidy", "", "solid"),
    ] {
        sqlx::query(
            r#"
            INSERT INTO teacher_evaluations
                (team_id, stage_name, rating, comment, strengths, improvements,
                 timestamp, created_at, updated_at)
            VALUES (?, ?, 4, ?, ?, ?, 0, 0, 0)
            "#,
        )
        .bind(team_id)
        .bind(stage)
        .bind(comment)
        .bind(strengths)
        .bind(improvements)
        .execute(&pool)
        .await
        .unwrap();
    }

    let read = evaluation::get_evaluation(&pool, team_id).await.unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read["PREPARATION"].positive_tags, vec!["quick", "tidy"]);
    assert_eq!(read["FIRE_MAKING"].improvement_tags, vec!["kindling prep"]);
    assert_eq!(read["FIRE_MAKING"].other_comment, "took three tries");
}

#[tokio::test]
async fn test_evaluation_absent_is_empty_map() {
    let (_dir, pool) = test_pool().await;
    submit::submit_document(&pool, &doc(json!({"teamInfo": identity("3号炉")})))
        .await
        .unwrap();

    let read = evaluation::get_evaluation(&pool, "PS1_5_A_3号炉")
        .await
        .unwrap();
    assert!(read.is_empty());
}

#[tokio::test]
async fn test_evaluation_for_unknown_team_rejected() {
    let (_dir, pool) = test_pool().await;

    let map = stage_map(&[("PREPARATION", &[], &[], "x")]);
    let err = evaluation::save_evaluation(&pool, "nope", "nope", &map)
        .await
        .unwrap_err();
    assert!(matches!(err, fieldday_common::Error::NotFound(_)));
}

#[tokio::test]
async fn test_pagination_correctness() {
    let (_dir, pool) = test_pool().await;

    for station in 1..=12 {
        let submission = doc(json!({"teamInfo": identity(&format!("{}号炉", station))}));
        submit::submit_document(&pool, &submission).await.unwrap();
    }

    let (page1, info1) = roster::evaluable_teams(&pool, 1, 5).await.unwrap();
    assert_eq!(info1.total_pages, 3);
    assert_eq!(info1.total_count, 12);
    assert_eq!(page1.len(), 5);
    assert!(!info1.has_prev);
    assert!(info1.has_next);

    let (page3, info3) = roster::evaluable_teams(&pool, 3, 5).await.unwrap();
    assert_eq!(page3.len(), 2);
    assert!(!info3.has_next);
    assert!(info3.has_prev);

    // Station numbers ascend across the pages
    let stations: Vec<i64> = page1
        .iter()
        .chain(page3.iter())
        .map(|team| roster::station_sort_key(&team.station_id))
        .collect();
    assert_eq!(stations, vec![1, 2, 3, 4, 5, 11, 12]);

    // Out-of-bounds page clamps to the last page
    let (clamped, info) = roster::evaluable_teams(&pool, 99, 5).await.unwrap();
    assert_eq!(info.current_page, 3);
    assert_eq!(clamped.len(), 2);
}

#[tokio::test]
async fn test_contention_resilience() {
    let (_dir, pool) = test_pool().await;

    let mut join_set = JoinSet::new();
    for worker in 0..8 {
        let pool = pool.clone();
        join_set.spawn(async move {
            let submission = doc(json!({
                "teamInfo": identity("3号炉"),
                "processRecord": {
                    "stages": {
                        "PREPARATION": {"startTime": worker, "isCompleted": true}
                    }
                }
            }));
            submit::submit_document(&pool, &submission).await
        });
    }

    while let Some(result) = join_set.join_next().await {
        let team_id = result.expect("task panicked").expect("submit failed");
        assert_eq!(team_id, "PS1_5_A_3号炉");
    }

    // Every writer eventually won; no duplicates, no dropped write
    assert_eq!(count(&pool, "teams").await, 1);
    assert_eq!(count(&pool, "process_records").await, 1);
    assert_eq!(count(&pool, "stage_records").await, 1);
}

#[tokio::test]
async fn test_clear_all_counts_and_empties() {
    let (_dir, pool) = test_pool().await;

    let submission = doc(json!({
        "teamInfo": identity("3号炉"),
        "teamDivision": {"groupLeader": "An"},
        "processRecord": {
            "stages": {"PREPARATION": {"mediaItems": [{"path": "p.jpg", "timestamp": 1}]}}
        },
        "summaryData": {"answer1": "a", "photos1": ["s.jpg"]}
    }));
    submit::submit_document(&pool, &submission).await.unwrap();

    let counts = fieldday_ds::db::admin::clear_all(&pool).await.unwrap();
    assert_eq!(counts["teams"], 1);
    assert_eq!(counts["team_divisions"], 1);
    assert_eq!(counts["process_records"], 1);
    assert_eq!(counts["stage_records"], 1);
    assert_eq!(counts["media_items"], 2);
    assert_eq!(counts["summary_data"], 1);

    for table in ["teams", "stage_records", "media_items", "summary_data"] {
        assert_eq!(count(&pool, table).await, 0, "{} not empty", table);
    }
}

#[tokio::test]
async fn test_statistics_rollup() {
    let (_dir, pool) = test_pool().await;

    submit::submit_document(
        &pool,
        &doc(json!({
            "teamInfo": identity("1号炉"),
            "processRecord": {
                "stages": {
                    "PREPARATION": {"isCompleted": true},
                    "FIRE_MAKING": {}
                }
            }
        })),
    )
    .await
    .unwrap();
    submit::submit_document(&pool, &doc(json!({"teamInfo": identity("2号炉")})))
        .await
        .unwrap();

    let stats = fieldday_ds::db::admin::get_statistics(&pool).await.unwrap();
    assert_eq!(stats.total_teams, 2);
    assert_eq!(stats.teams_with_process, 1);
    assert_eq!(stats.teams_with_summary, 0);
    assert_eq!(stats.total_stages, 2);
    assert_eq!(stats.total_completed_stages, 1);
    assert!((stats.average_completion - 50.0).abs() < f64::EPSILON);
}
