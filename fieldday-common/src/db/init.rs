//! Database initialization
//!
//! Creates the connection pool and the full relational schema on first run.
//! Safe to call against an existing database: every statement is
//! `IF NOT EXISTS`.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize the database connection pool and create tables if needed.
///
/// Connection options apply to every connection the pool opens: foreign keys
/// enforced (child cleanup relies on cascade deletes), WAL so readers are
/// never blocked by the single writer, and a bounded busy wait at the store
/// before the engine's own retry layer takes over.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create every table and index. Idempotent.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_teams_table(pool).await?;
    create_team_divisions_table(pool).await?;
    create_process_records_table(pool).await?;
    create_stage_records_table(pool).await?;
    create_summary_data_table(pool).await?;
    create_media_items_table(pool).await?;
    create_teacher_evaluations_table(pool).await?;
    create_teacher_evaluations_v2_table(pool).await?;
    create_evaluation_teams_table(pool).await?;
    Ok(())
}

/// Create the teams table.
///
/// One row per team; the derived `team_id` (natural key fields joined with
/// `_`) is what every child table references.
pub async fn create_teams_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT UNIQUE NOT NULL,
            school TEXT NOT NULL,
            grade TEXT NOT NULL,
            class_name TEXT NOT NULL,
            station_id TEXT NOT NULL,
            member_count INTEGER NOT NULL DEFAULT 0,
            member_names TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            UNIQUE(school, grade, class_name, station_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_teams_team_id ON teams(team_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_teams_school ON teams(school)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_teams_station_id ON teams(station_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_team_divisions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_divisions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            group_leader TEXT,
            group_cooking TEXT,
            group_soup_rice TEXT,
            group_fire TEXT,
            group_health TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (team_id) REFERENCES teams(team_id) ON DELETE CASCADE,
            UNIQUE(team_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_team_divisions_team_id ON team_divisions(team_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_process_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS process_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            start_time INTEGER NOT NULL DEFAULT 0,
            end_time INTEGER,
            current_stage TEXT,
            overall_notes TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (team_id) REFERENCES teams(team_id) ON DELETE CASCADE,
            UNIQUE(team_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_process_records_team_id ON process_records(team_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_stage_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stage_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            process_record_id INTEGER NOT NULL,
            stage_name TEXT NOT NULL,
            start_time INTEGER NOT NULL DEFAULT 0,
            end_time INTEGER,
            self_rating INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            problem_notes TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            selected_tags TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (process_record_id) REFERENCES process_records(id) ON DELETE CASCADE,
            UNIQUE(process_record_id, stage_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stage_records_process_id ON stage_records(process_record_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stage_records_stage_name ON stage_records(stage_name)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_summary_data_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS summary_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            answer1 TEXT,
            answer2 TEXT,
            answer3 TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (team_id) REFERENCES teams(team_id) ON DELETE CASCADE,
            UNIQUE(team_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_summary_data_team_id ON summary_data(team_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the media_items table.
///
/// A media row attaches either to a stage record or to a summary question
/// (second optional foreign key); both parents cascade.
async fn create_media_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            stage_record_id INTEGER,
            summary_data_id INTEGER,
            summary_question INTEGER,
            file_path TEXT NOT NULL,
            file_type TEXT NOT NULL DEFAULT 'PHOTO',
            file_size INTEGER,
            timestamp INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (stage_record_id) REFERENCES stage_records(id) ON DELETE CASCADE,
            FOREIGN KEY (summary_data_id) REFERENCES summary_data(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_media_items_stage_id ON media_items(stage_record_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_media_items_summary_id ON media_items(summary_data_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_media_items_type ON media_items(file_type)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the generation-1 teacher_evaluations table.
///
/// Legacy per-stage rows; kept readable for databases written by older
/// deployments. New writes go to teacher_evaluations_v2.
async fn create_teacher_evaluations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teacher_evaluations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            stage_name TEXT,
            rating INTEGER NOT NULL DEFAULT 0,
            comment TEXT,
            strengths TEXT,
            improvements TEXT,
            timestamp INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (team_id) REFERENCES teams(team_id) ON DELETE CASCADE,
            UNIQUE(team_id, stage_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_teacher_evaluations_team_id ON teacher_evaluations(team_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_teacher_evaluations_v2_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teacher_evaluations_v2 (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            schema_version INTEGER NOT NULL DEFAULT 1,
            extra_data TEXT,
            FOREIGN KEY (team_id) REFERENCES teams(team_id) ON DELETE CASCADE,
            UNIQUE(team_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_teacher_evaluations_v2_team_id ON teacher_evaluations_v2(team_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the evaluation_teams lookup table.
///
/// Denormalized `{team_id, team_name}` maintained alongside every v2 write so
/// the display name survives independent of the teams table. Deliberately no
/// foreign key.
async fn create_evaluation_teams_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evaluation_teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id TEXT NOT NULL,
            team_name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(team_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
