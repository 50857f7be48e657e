//! Core traits for notekeeper collaborators.
//!
//! The services only talk to storage and credential hashing through these
//! traits, so backends can be swapped (PostgreSQL, in-memory) and tested in
//! isolation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Note, User};

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Storage for registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user. Fails with `DuplicateUser` if the email is taken.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Storage for notes, always scoped to an owner.
///
/// Tag arguments are expected to be normalized already.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Fetch a note by the `(id, owner)` pair in a single lookup.
    async fn find_by_id_and_owner(&self, id: Uuid, owner: &User) -> Result<Option<Note>>;

    /// All notes owned by `owner`.
    async fn find_by_owner(&self, owner: &User) -> Result<Vec<Note>>;

    /// Notes owned by `owner` with at least one tag containing `substring`.
    async fn find_by_tag_substring_and_owner(
        &self,
        substring: &str,
        owner: &User,
    ) -> Result<Vec<Note>>;

    /// Notes owned by `owner` whose distinct tags include all `tag_count`
    /// distinct entries of `tags`.
    async fn find_matching_all_tags_and_owner(
        &self,
        tags: &[String],
        tag_count: i64,
        owner: &User,
    ) -> Result<Vec<Note>>;

    /// Insert or update a note. Ownership of an existing note never changes.
    async fn save(&self, note: Note) -> Result<Note>;

    /// Delete a note.
    async fn delete(&self, note: &Note) -> Result<()>;
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Password hashing and verification.
pub trait PasswordHasher: Send + Sync {
    /// Encode a raw password for storage.
    fn hash_password(&self, raw: &str) -> Result<String>;

    /// Compare a raw password with a stored encoding.
    fn verify_password(&self, raw: &str, encoded: &str) -> bool;
}
