use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_PLAYER_NAME: &str = "Adventurer";
pub const DEFAULT_THEME_PACK: &str = "default";

/// The single player row (`id = 1`); doubles as the settings record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub level: i64,
    pub xp: i64,
    pub weeks_completed_towards_next_level: i64,
    pub weeks_required_for_next_level: i64,
    pub grit_current: i64,
    pub grit_max: i64,
    pub coins: i64,
    pub campfire_tokens: i64,
    pub streak_current: i64,
    pub streak_best: i64,
    pub theme_pack: String,
    pub testing_mode: bool,
    /// Empty means "use the configured default timezone"
    pub day_timezone: String,
    pub discord_webhook_url: Option<String>,
    pub ntfy_topic_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub theme_pack: String,
    #[serde(default)]
    pub testing_mode: bool,
    #[serde(default)]
    pub day_timezone: Option<String>,
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
    #[serde(default)]
    pub ntfy_topic_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub name: String,
    pub theme_pack: String,
    pub testing_mode: bool,
    pub day_timezone: String,
    pub discord_webhook_url: Option<String>,
    pub ntfy_topic_url: Option<String>,
    pub available_theme_packs: Vec<String>,
}

impl SettingsView {
    pub fn new(player: &Player, effective_timezone: String, available_theme_packs: Vec<String>) -> Self {
        Self {
            name: player.name.clone(),
            theme_pack: player.theme_pack.clone(),
            testing_mode: player.testing_mode,
            day_timezone: effective_timezone,
            discord_webhook_url: player.discord_webhook_url.clone(),
            ntfy_topic_url: player.ntfy_topic_url.clone(),
            available_theme_packs,
        }
    }
}
