#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use gain_rpg::api::{create_routes, AppState};
use gain_rpg::commands::open_database;
use gain_rpg::config::{AppConfig, DatabaseConfig};
use gain_rpg::jobs::JobContext;
use gain_rpg::notifier::RetryPolicy;
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A migrated SQLite file in a temporary directory, plus a theme pack
/// directory next to it. In-memory databases are per connection, so tests
/// always go through a file.
pub struct TestDatabase {
    dir: TempDir,
    pub pool: SqlitePool,
    pub config: AppConfig,
}

impl TestDatabase {
    pub async fn new() -> Self {
        init_test_logging();

        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = AppConfig {
            theme_pack_dir: dir.path().join("theme_packs"),
            ..AppConfig::default()
        };
        let db_config = DatabaseConfig::for_path(dir.path().join("test.sqlite3"));

        let pool = open_database(&db_config, &config)
            .await
            .expect("Failed to open test database");

        Self { dir, pool, config }
    }

    pub fn theme_pack_dir(&self) -> PathBuf {
        self.config.theme_pack_dir.clone()
    }

    /// Write `contents` to `relative` inside the theme pack directory.
    pub fn write_theme_file(&self, relative: &str, contents: &str) {
        let path = self.theme_pack_dir().join(relative);
        fs::create_dir_all(path.parent().unwrap_or(Path::new("."))).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn job_context(&self) -> JobContext {
        JobContext::new(self.pool.clone(), self.config.clone()).with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.pool.clone(), self.config.clone())
    }

    pub fn router(&self) -> axum::Router {
        create_routes(self.app_state())
    }

    pub async fn set_notifier(&self, discord_webhook_url: Option<&str>, ntfy_topic_url: Option<&str>) {
        sqlx::query("UPDATE player SET discord_webhook_url = ?, ntfy_topic_url = ? WHERE id = 1")
            .bind(discord_webhook_url)
            .bind(ntfy_topic_url)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn set_timezone(&self, timezone: &str) {
        sqlx::query("UPDATE player SET day_timezone = ? WHERE id = 1")
            .bind(timezone)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn set_testing_mode(&self, enabled: bool) {
        sqlx::query("UPDATE player SET testing_mode = ? WHERE id = 1")
            .bind(enabled)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    /// Insert a bare summary row, as if an earlier tick had written it.
    pub async fn insert_summary(&self, date: NaiveDate, minimum_set_done: bool, streak: i64) {
        sqlx::query(
            "INSERT INTO daily_summary (
                date, pushups, situps, squats, pullups, minimum_set_done,
                grit_restored, xp_earned, streak, encounter_outcome, coins_earned, created_at
            ) VALUES (?, 0, 0, 0, 0, ?, 0, 0, ?, NULL, 0, ?)",
        )
        .bind(date)
        .bind(minimum_set_done)
        .bind(streak)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .unwrap();
    }

    /// Store raw encounter JSON for `date`, replacing any roll.
    pub async fn store_raw_encounter(&self, date: NaiveDate, encounter_json: &str) {
        sqlx::query(
            "INSERT OR REPLACE INTO daily_roll (date, encounter_json, reroll_count, generated_at)
             VALUES (?, ?, 0, ?)",
        )
        .bind(date)
        .bind(encounter_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .unwrap();
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
