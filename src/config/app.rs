use anyhow::Result;
use std::env;
use std::path::PathBuf;

use super::env_or;
use crate::jobs::ScheduleWindows;
use crate::models::MinimumSet;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `development` allows cross-origin requests from anywhere
    pub environment: String,
    pub log_level: String,
    /// Directory holding theme packs (`<name>.json` files or `<name>/` folders)
    pub theme_pack_dir: PathBuf,
    /// IANA timezone used when the player has not chosen one
    pub default_timezone: String,
    pub minimum_set: MinimumSet,
    pub windows: ScheduleWindows,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_or("PORT", 8000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let theme_pack_dir = env::var("THEME_PACK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("theme_packs"));
        let default_timezone = env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());

        let defaults = MinimumSet::default();
        let minimum_set = MinimumSet {
            pushups: env_or("MIN_PUSHUPS", defaults.pushups),
            situps: env_or("MIN_SITUPS", defaults.situps),
            squats: env_or("MIN_SQUATS", defaults.squats),
            pullups: env_or("MIN_PULLUPS", defaults.pullups),
        };

        let default_windows = ScheduleWindows::default();
        let windows = ScheduleWindows {
            midnight_hour: env_or("MIDNIGHT_HOUR", default_windows.midnight_hour),
            morning_hour: env_or("MORNING_HOUR", default_windows.morning_hour),
            evening_hour: env_or("EVENING_HOUR", default_windows.evening_hour),
            window_minutes: env_or("WINDOW_MINUTES", default_windows.window_minutes),
        };

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            theme_pack_dir,
            default_timezone,
            minimum_set,
            windows,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &str {
        &self.log_level
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            theme_pack_dir: PathBuf::from("theme_packs"),
            default_timezone: "UTC".to_string(),
            minimum_set: MinimumSet::default(),
            windows: ScheduleWindows::default(),
        }
    }
}
