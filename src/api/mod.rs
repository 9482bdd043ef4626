// API routes and handlers

pub mod encounter;
pub mod errors;
pub mod health;
pub mod inventory;
pub mod progress;
pub mod routes;
pub mod settings;
pub mod state;
pub mod today;
pub mod workout;

pub use errors::ApiError;
pub use routes::create_routes;
pub use state::AppState;
