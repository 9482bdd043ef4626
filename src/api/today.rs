use axum::{extract::State, response::Json, routing::get, Router};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::{ApiError, AppState};
use crate::content::stable_seed;
use crate::models::{CombatStats, Encounter, EncounterResult, MinimumSet, Player, WorkoutLog};
use crate::services::clock::local_date;

#[derive(Debug, Serialize)]
pub struct TodayView {
    pub date: NaiveDate,
    pub timezone: String,
    pub player: Player,
    pub combat_stats: CombatStats,
    pub workout: WorkoutLog,
    pub minimum_set: MinimumSet,
    pub meets_minimum: bool,
    /// Grit the current reps would restore on lock-in
    pub preview_grit: i64,
    pub encounter: Encounter,
    pub encounter_result: Option<EncounterResult>,
    pub reroll_count: i64,
    pub narrative: Option<String>,
}

pub fn today_routes() -> Router<AppState> {
    Router::new().route("/today", get(get_today))
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayView>, ApiError> {
    let player = state.players.get_player().await?;
    let tz = state.players.timezone_for(&player);
    let date = local_date(Utc::now(), tz);

    let workout = state.workouts.get_log(date).await?;
    let roll = state.encounters.get_or_create_roll(date).await?;
    let combat_stats = state.inventory.combat_stats().await?;
    let minimum_set = state.workouts.minimum_set();

    let pack = state.theme_packs.load(&player.theme_pack);
    let date_key = date.to_string();
    let narrative = Some(pack.narrative_line(
        "today",
        stable_seed(&["today", date_key.as_str()]),
        "",
    ))
    .filter(|line| !line.is_empty());

    let reps = workout.reps();
    Ok(Json(TodayView {
        date,
        timezone: tz.name().to_string(),
        combat_stats,
        meets_minimum: reps.meets(&minimum_set),
        preview_grit: reps.grit_restore(),
        minimum_set,
        workout,
        encounter: roll.encounter,
        encounter_result: roll.result,
        reroll_count: roll.reroll_count,
        narrative,
        player,
    }))
}
