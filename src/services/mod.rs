// Business logic services

pub mod clock;
pub mod encounter_service;
pub mod errors;
pub mod inventory_service;
pub mod player_service;
pub mod summary_service;
pub mod workout_service;

pub use encounter_service::EncounterService;
pub use errors::GameError;
pub use inventory_service::InventoryService;
pub use player_service::PlayerService;
pub use summary_service::SummaryService;
pub use workout_service::WorkoutService;
