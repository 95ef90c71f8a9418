// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod error;
pub mod matcher;
pub mod reference;
pub mod roster;
pub mod state;
pub mod tasks;
pub mod types;
