//! Shared application state.

use std::sync::Arc;

use notekeeper_core::{
    AccountService, AuthGate, NoteRepository, NoteService, PasswordHasher, PathPolicy,
    TokenCodec, UserRepository,
};

/// State cloned into every handler and the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub accounts: AccountService,
    pub notes: NoteService,
    /// Serve Swagger UI and the OpenAPI document.
    pub docs_enabled: bool,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notes: Arc<dyn NoteRepository>,
        hasher: Arc<dyn PasswordHasher>,
        codec: TokenCodec,
        docs_enabled: bool,
    ) -> Self {
        let gate = AuthGate::new(PathPolicy::with_defaults(docs_enabled), codec.clone());
        Self {
            gate: Arc::new(gate),
            accounts: AccountService::new(users.clone(), hasher, codec),
            notes: NoteService::new(notes, users),
            docs_enabled,
        }
    }
}
