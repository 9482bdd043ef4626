use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Today's threat, stored as JSON in `daily_roll.encounter_json`.
///
/// Every field has a default so that partially written or hand-edited rows
/// still load; see [`Encounter::from_stored`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Encounter {
    pub threat_name: String,
    pub hp: i64,
    pub damage: i64,
    pub tag: String,
    #[serde(deserialize_with = "lenient_string_list")]
    pub stakes: Vec<String>,
    pub reward_table_key: String,
}

impl Default for Encounter {
    fn default() -> Self {
        Self {
            threat_name: "Unknown threat".to_string(),
            hp: 3,
            damage: 1,
            tag: "unknown".to_string(),
            stakes: Vec::new(),
            reward_table_key: "default".to_string(),
        }
    }
}

impl Encounter {
    /// Parse a stored encounter, falling back to the placeholder on bad JSON.
    pub fn from_stored(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(encounter) => encounter,
            Err(e) => {
                tracing::warn!("Stored encounter is not valid JSON, using placeholder: {}", e);
                Self::default()
            }
        }
    }
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    Strike,
    Guard,
    Auto,
}

impl FromStr for CombatAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strike" => Ok(CombatAction::Strike),
            "guard" => Ok(CombatAction::Guard),
            "auto" => Ok(CombatAction::Auto),
            other => Err(format!("Unknown combat action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterOutcome {
    Defeat,
    Overwhelm,
    SurvivedWithConsequence,
}

impl EncounterOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncounterOutcome::Defeat => "defeat",
            EncounterOutcome::Overwhelm => "overwhelm",
            EncounterOutcome::SurvivedWithConsequence => "survived_with_consequence",
        }
    }

    /// The threat went down, one way or another
    pub fn is_victory(&self) -> bool {
        matches!(self, EncounterOutcome::Defeat | EncounterOutcome::Overwhelm)
    }
}

impl fmt::Display for EncounterOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fight state, stored as JSON in `daily_roll.result_json` after every round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterResult {
    pub threat_hp: i64,
    pub grit_loss: i64,
    pub round: i64,
    pub complete: bool,
    pub outcome: Option<EncounterOutcome>,
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default)]
    pub applied: bool,
    #[serde(default)]
    pub coins_earned: Option<i64>,
}

impl EncounterResult {
    pub fn start(encounter: &Encounter) -> Self {
        Self {
            threat_hp: encounter.hp,
            grit_loss: 0,
            round: 0,
            complete: false,
            outcome: None,
            log: Vec::new(),
            applied: false,
            coins_earned: None,
        }
    }

    /// Parse a stored result; bad JSON counts as "not started".
    pub fn from_stored(raw: Option<&str>) -> Option<Self> {
        let raw = raw?;
        match serde_json::from_str(raw) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!("Stored encounter result is not valid JSON, ignoring: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyRollRow {
    pub date: NaiveDate,
    pub encounter_json: String,
    pub reroll_count: i64,
    pub generated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub result_json: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyRoll {
    pub date: NaiveDate,
    pub encounter: Encounter,
    pub result: Option<EncounterResult>,
    pub reroll_count: i64,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<DailyRollRow> for DailyRoll {
    fn from(row: DailyRollRow) -> Self {
        Self {
            date: row.date,
            encounter: Encounter::from_stored(&row.encounter_json),
            result: EncounterResult::from_stored(row.result_json.as_deref()),
            reroll_count: row.reroll_count,
            resolved_at: row.resolved_at,
        }
    }
}

impl DailyRoll {
    pub fn is_resolved(&self) -> bool {
        self.result.as_ref().map(|r| r.complete).unwrap_or(false)
    }
}
