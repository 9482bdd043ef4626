// Persistent records and the value types that flow between services

pub mod encounter;
pub mod inventory;
pub mod player;
pub mod summary;
pub mod workout;

pub use encounter::*;
pub use inventory::*;
pub use player::*;
pub use summary::*;
pub use workout::*;
