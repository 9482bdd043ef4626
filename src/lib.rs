pub mod api;
pub mod commands;
pub mod config;
pub mod content;
pub mod jobs;
pub mod models;
pub mod notifier;
pub mod services;
