//! HTTP handlers for notekeeper-api.

pub mod health;
pub mod notes;
pub mod users;
