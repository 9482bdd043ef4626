use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{CombatStats, Player};

/// End-of-day rollup written by the midnight tick.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub pushups: i64,
    pub situps: i64,
    pub squats: i64,
    pub pullups: i64,
    pub minimum_set_done: bool,
    pub grit_restored: i64,
    pub xp_earned: i64,
    pub streak: i64,
    pub encounter_outcome: Option<String>,
    pub coins_earned: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub date: NaiveDate,
    pub player: Player,
    pub combat_stats: CombatStats,
    pub recent_summaries: Vec<DailySummary>,
}

/// Short text used by reminders: what threatens the player tonight and how it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationSummary {
    pub threat: String,
    pub resolved: bool,
    pub result: Option<String>,
}
