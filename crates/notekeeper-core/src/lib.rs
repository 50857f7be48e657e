//! # notekeeper-core
//!
//! Core types, traits and services for notekeeper.
//!
//! This crate holds the authentication pipeline (token codec and request
//! gate), tag normalization and the note query engine. It performs no I/O of
//! its own: storage and password hashing are reached through the traits in
//! [`traits`].

pub mod accounts;
pub mod defaults;
pub mod error;
pub mod gate;
pub mod models;
pub mod notes;
pub mod tags;
pub mod token;
pub mod traits;

// Re-export commonly used types at crate root
pub use accounts::AccountService;
pub use error::{Error, Result};
pub use gate::{AuthGate, GateDecision, GateRejection, PathPolicy, PathRule};
pub use models::*;
pub use notes::NoteService;
pub use tags::{normalize_tag, normalize_tags};
pub use token::{Claims, TokenCodec};
pub use traits::*;
