use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::{SqliteConnection, SqlitePool};

use crate::content::{stable_seed, weighted_choice, ThemePack, ThemePackLoader};
use crate::models::{
    CombatAction, CombatStats, DailyRoll, DailyRollRow, Encounter, EncounterOutcome,
    EncounterResult, NotificationSummary,
};
use crate::services::inventory_service::combat_stats;
use crate::services::player_service::fetch_player;
use crate::services::GameError;

const ROLL_COLUMNS: &str = "date, encounter_json, reroll_count, generated_at, resolved_at, result_json";

/// Threats used when the active theme pack defines none: (name, tag)
const BUILTIN_THREATS: [(&str, &str); 5] = [
    ("Bramblefang", "beast"),
    ("Ashroad Bandit", "bandit"),
    ("Gloom Wisp", "curse"),
    ("Crypt Hound", "undead"),
    ("Ridge Stalker", "beast"),
];

#[derive(Debug, Clone)]
pub struct EncounterService {
    db: SqlitePool,
    theme_packs: ThemePackLoader,
}

impl EncounterService {
    pub fn new(db: SqlitePool, theme_packs: ThemePackLoader) -> Self {
        Self { db, theme_packs }
    }

    pub async fn get_or_create_roll(&self, date: NaiveDate) -> Result<DailyRoll> {
        let mut conn = self.db.acquire().await?;
        let row = ensure_roll(&mut conn, &self.theme_packs, date).await?;
        Ok(row.into())
    }

    pub async fn find_roll(&self, date: NaiveDate) -> Result<Option<DailyRoll>> {
        let mut conn = self.db.acquire().await?;
        Ok(find_roll(&mut conn, date).await?.map(DailyRoll::from))
    }

    pub async fn resolve(&self, date: NaiveDate, action: CombatAction) -> Result<EncounterResult> {
        let mut tx = self.db.begin().await?;
        let result = resolve_encounter(&mut tx, &self.theme_packs, date, action).await?;
        tx.commit().await?;

        if let Some(outcome) = result.outcome {
            tracing::info!(
                "Encounter for {} finished after {} rounds: {} (grit lost {})",
                date,
                result.round,
                outcome,
                result.grit_loss
            );
        }
        Ok(result)
    }

    /// Replace today's threat with a fresh roll. Only allowed in testing mode
    /// and before any round has been fought.
    pub async fn reroll(&self, date: NaiveDate) -> Result<DailyRoll> {
        let mut tx = self.db.begin().await?;

        let player = fetch_player(&mut tx).await?;
        if !player.testing_mode {
            return Err(GameError::RerollNotAllowed.into());
        }

        let row = ensure_roll(&mut tx, &self.theme_packs, date).await?;
        if EncounterResult::from_stored(row.result_json.as_deref()).is_some() {
            return Err(GameError::EncounterStarted(date).into());
        }

        let reroll_count = row.reroll_count + 1;
        let pack = self.theme_packs.load(&player.theme_pack);
        let encounter = build_encounter(date, reroll_count, &pack);

        sqlx::query(
            "UPDATE daily_roll SET encounter_json = ?, reroll_count = ?, generated_at = ? WHERE date = ?",
        )
        .bind(serde_json::to_string(&encounter)?)
        .bind(reroll_count)
        .bind(Utc::now())
        .bind(date)
        .execute(&mut *tx)
        .await?;

        let row = find_roll(&mut tx, date)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Daily roll for {} vanished during reroll", date))?;
        tx.commit().await?;

        tracing::info!("Rerolled encounter for {} (reroll #{})", date, reroll_count);
        Ok(row.into())
    }

    pub async fn notification_summary(&self, date: NaiveDate) -> Result<NotificationSummary> {
        let roll = self.get_or_create_roll(date).await?;
        let outcome = roll
            .result
            .as_ref()
            .filter(|r| r.complete)
            .and_then(|r| r.outcome);

        Ok(NotificationSummary {
            threat: roll.encounter.threat_name,
            resolved: outcome.is_some(),
            result: outcome.map(|o| o.to_string()),
        })
    }
}

/// Deterministic encounter for a date; `reroll_count` perturbs the seed.
pub fn build_encounter(date: NaiveDate, reroll_count: i64, pack: &ThemePack) -> Encounter {
    let seed = if reroll_count == 0 {
        (date.year() as u64) * 10_000 + (date.month() as u64) * 100 + date.day() as u64
    } else {
        let date_key = date.to_string();
        let reroll_key = reroll_count.to_string();
        stable_seed(&[date_key.as_str(), "reroll", reroll_key.as_str()])
    };
    let mut rng = StdRng::seed_from_u64(seed);

    let (threat_name, tag, stakes) = match weighted_choice(&mut rng, &pack.threats) {
        Some(threat) if !threat.name.is_empty() => {
            (threat.name.clone(), threat.tag.clone(), threat.stakes.clone())
        }
        _ => {
            let (name, tag) = BUILTIN_THREATS[rng.gen_range(0..BUILTIN_THREATS.len())];
            (name.to_string(), tag.to_string(), Vec::new())
        }
    };

    Encounter {
        threat_name,
        hp: rng.gen_range(3..=8),
        damage: rng.gen_range(1..=4),
        tag,
        stakes,
        reward_table_key: "default".to_string(),
    }
}

/// Play one round in place.
pub fn resolve_round(
    state: &mut EncounterResult,
    action: CombatAction,
    encounter: &Encounter,
    stats: &CombatStats,
) {
    match action {
        CombatAction::Guard => {
            let taken = (encounter.damage - stats.guard - 1).max(0);
            state.threat_hp -= 1;
            state.grit_loss += taken;
            state.log.push(format!("Guard chip for 1, take {}.", taken));
        }
        _ => {
            state.threat_hp -= stats.attack;
            state.log.push(format!("Strike for {} damage.", stats.attack));
            if state.threat_hp > 0 {
                state.grit_loss += encounter.damage;
                state
                    .log
                    .push(format!("{} hits for {}.", encounter.threat_name, encounter.damage));
            }
        }
    }
}

/// Advance the fight with `action` against a grit pool of `grit`, then mark
/// it complete when either side is spent.
pub fn play(
    mut state: EncounterResult,
    action: CombatAction,
    encounter: &Encounter,
    stats: &CombatStats,
    grit: i64,
) -> EncounterResult {
    if state.complete {
        return state;
    }

    let mut last_action = action;
    let fighting = |s: &EncounterResult| s.threat_hp > 0 && s.grit_loss < grit;

    match action {
        CombatAction::Auto => {
            while fighting(&state) {
                state.round += 1;
                last_action = if grit - state.grit_loss > 2 {
                    CombatAction::Strike
                } else {
                    CombatAction::Guard
                };
                resolve_round(&mut state, last_action, encounter, stats);
            }
        }
        manual => {
            if fighting(&state) {
                state.round += 1;
                resolve_round(&mut state, manual, encounter, stats);
            }
        }
    }

    if state.threat_hp <= 0 {
        state.complete = true;
        state.outcome = Some(if last_action == CombatAction::Guard {
            EncounterOutcome::Overwhelm
        } else {
            EncounterOutcome::Defeat
        });
    } else if state.grit_loss >= grit {
        state.complete = true;
        state.outcome = Some(EncounterOutcome::SurvivedWithConsequence);
    }

    state
}

/// Coins for a finished fight: 3 for overwhelm, 2 otherwise, one less when grit hit zero.
pub fn coins_for(outcome: Option<EncounterOutcome>, end_grit: i64) -> i64 {
    let coins: i64 = if outcome == Some(EncounterOutcome::Overwhelm) { 3 } else { 2 };
    if end_grit == 0 {
        (coins - 1).max(0)
    } else {
        coins
    }
}

pub(crate) async fn find_roll(conn: &mut SqliteConnection, date: NaiveDate) -> Result<Option<DailyRollRow>> {
    let row = sqlx::query_as::<_, DailyRollRow>(&format!(
        "SELECT {} FROM daily_roll WHERE date = ?",
        ROLL_COLUMNS
    ))
    .bind(date)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row)
}

pub(crate) async fn ensure_roll(
    conn: &mut SqliteConnection,
    theme_packs: &ThemePackLoader,
    date: NaiveDate,
) -> Result<DailyRollRow> {
    if let Some(row) = find_roll(conn, date).await? {
        return Ok(row);
    }

    let player = fetch_player(conn).await?;
    let pack = theme_packs.load(&player.theme_pack);
    let encounter = build_encounter(date, 0, &pack);

    sqlx::query(
        "INSERT INTO daily_roll (date, encounter_json, reroll_count, generated_at)
         VALUES (?, ?, 0, ?)
         ON CONFLICT(date) DO NOTHING",
    )
    .bind(date)
    .bind(serde_json::to_string(&encounter)?)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    tracing::debug!("Rolled {} for {}", encounter.threat_name, date);
    find_roll(conn, date)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Daily roll for {} vanished after insert", date))
}

pub(crate) async fn resolve_encounter(
    conn: &mut SqliteConnection,
    theme_packs: &ThemePackLoader,
    date: NaiveDate,
    action: CombatAction,
) -> Result<EncounterResult> {
    let row = ensure_roll(conn, theme_packs, date).await?;
    let encounter = Encounter::from_stored(&row.encounter_json);
    let existing = EncounterResult::from_stored(row.result_json.as_deref());

    if let Some(result) = existing.as_ref().filter(|r| r.complete) {
        return Ok(result.clone());
    }

    let player = fetch_player(conn).await?;
    let stats = combat_stats(conn).await?;
    let starting_grit = player.grit_current;

    let state = existing.unwrap_or_else(|| EncounterResult::start(&encounter));
    let mut state = play(state, action, &encounter, &stats, starting_grit);

    if state.complete && !state.applied {
        let end_grit = (starting_grit - state.grit_loss).max(0);
        let coins = coins_for(state.outcome, end_grit);

        sqlx::query("UPDATE player SET grit_current = ?, coins = coins + ? WHERE id = 1")
            .bind(end_grit)
            .bind(coins)
            .execute(&mut *conn)
            .await?;

        state.coins_earned = Some(coins);
        state.applied = true;

        sqlx::query("UPDATE daily_roll SET result_json = ?, resolved_at = ? WHERE date = ?")
            .bind(serde_json::to_string(&state)?)
            .bind(Utc::now())
            .bind(date)
            .execute(&mut *conn)
            .await?;
    } else {
        sqlx::query("UPDATE daily_roll SET result_json = ? WHERE date = ?")
            .bind(serde_json::to_string(&state)?)
            .bind(date)
            .execute(&mut *conn)
            .await?;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ThreatEntry;

    fn encounter(hp: i64, damage: i64) -> Encounter {
        Encounter {
            threat_name: "Crypt Hound".to_string(),
            hp,
            damage,
            ..Encounter::default()
        }
    }

    fn stats(attack: i64, guard: i64) -> CombatStats {
        CombatStats { attack, guard, grit_bonus: 0 }
    }

    #[test]
    fn test_build_encounter_is_deterministic_per_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 21).unwrap();
        let pack = ThemePack::default();
        let a = build_encounter(date, 0, &pack);
        let b = build_encounter(date, 0, &pack);
        assert_eq!(a, b);
        assert!((3..=8).contains(&a.hp));
        assert!((1..=4).contains(&a.damage));
    }

    #[test]
    fn test_build_encounter_uses_theme_pack_threats() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let pack = ThemePack {
            threats: vec![ThreatEntry {
                name: "Frost Warden".to_string(),
                tag: "frontier".to_string(),
                weight: 1,
                stakes: vec!["The pass stays closed".to_string()],
            }],
            ..ThemePack::default()
        };
        let rolled = build_encounter(date, 0, &pack);
        assert_eq!(rolled.threat_name, "Frost Warden");
        assert_eq!(rolled.stakes, vec!["The pass stays closed".to_string()]);
    }

    #[test]
    fn test_strike_takes_damage_only_when_threat_survives() {
        let foe = encounter(5, 3);
        let mut state = EncounterResult::start(&foe);
        resolve_round(&mut state, CombatAction::Strike, &foe, &stats(2, 1));
        assert_eq!(state.threat_hp, 3);
        assert_eq!(state.grit_loss, 3);

        resolve_round(&mut state, CombatAction::Strike, &foe, &stats(3, 1));
        assert_eq!(state.threat_hp, 0);
        assert_eq!(state.grit_loss, 3);
    }

    #[test]
    fn test_guard_reduces_damage() {
        let foe = encounter(5, 4);
        let mut state = EncounterResult::start(&foe);
        resolve_round(&mut state, CombatAction::Guard, &foe, &stats(2, 1));
        assert_eq!(state.threat_hp, 4);
        assert_eq!(state.grit_loss, 2);
    }

    #[test]
    fn test_auto_defeats_weak_threat() {
        let foe = encounter(4, 1);
        let result = play(EncounterResult::start(&foe), CombatAction::Auto, &foe, &stats(2, 1), 5);
        assert!(result.complete);
        assert_eq!(result.outcome, Some(EncounterOutcome::Defeat));
        assert_eq!(result.round, 2);
        assert_eq!(result.grit_loss, 1);
    }

    #[test]
    fn test_auto_finishing_on_guard_is_overwhelm() {
        // 2 grit: always guard, guard 1 absorbs damage 2 entirely
        let foe = encounter(3, 2);
        let result = play(EncounterResult::start(&foe), CombatAction::Auto, &foe, &stats(2, 1), 2);
        assert_eq!(result.outcome, Some(EncounterOutcome::Overwhelm));
        assert_eq!(result.grit_loss, 0);
        assert_eq!(result.round, 3);
    }

    #[test]
    fn test_running_out_of_grit_is_survived_with_consequence() {
        let foe = encounter(8, 4);
        let result = play(EncounterResult::start(&foe), CombatAction::Strike, &foe, &stats(2, 1), 3);
        assert!(result.complete);
        assert_eq!(result.outcome, Some(EncounterOutcome::SurvivedWithConsequence));
    }

    #[test]
    fn test_manual_round_leaves_fight_open() {
        let foe = encounter(8, 1);
        let result = play(EncounterResult::start(&foe), CombatAction::Strike, &foe, &stats(2, 1), 5);
        assert!(!result.complete);
        assert_eq!(result.round, 1);
        assert_eq!(result.threat_hp, 6);
    }

    #[test]
    fn test_coins_for_outcomes() {
        assert_eq!(coins_for(Some(EncounterOutcome::Overwhelm), 3), 3);
        assert_eq!(coins_for(Some(EncounterOutcome::Defeat), 3), 2);
        assert_eq!(coins_for(Some(EncounterOutcome::SurvivedWithConsequence), 0), 1);
    }
}
