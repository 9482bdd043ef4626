use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::content::ThemePackLoader;
use crate::services::{
    EncounterService, InventoryService, PlayerService, SummaryService, WorkoutService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub theme_packs: ThemePackLoader,
    pub players: PlayerService,
    pub workouts: WorkoutService,
    pub encounters: EncounterService,
    pub inventory: InventoryService,
    pub summaries: SummaryService,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let theme_packs = ThemePackLoader::new(config.theme_pack_dir.clone());
        Self {
            players: PlayerService::new(db.clone(), config.default_timezone.clone()),
            workouts: WorkoutService::new(db.clone(), config.minimum_set),
            encounters: EncounterService::new(db.clone(), theme_packs.clone()),
            inventory: InventoryService::new(db.clone()),
            summaries: SummaryService::new(db),
            theme_packs,
            config,
        }
    }
}
