// Configuration loaded from the environment

pub mod app;
pub mod database;

pub use app::*;
pub use database::*;

use std::env;
use std::str::FromStr;

/// Read `key` from the environment, falling back to `default` when unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable value for {}: {:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
