//! Note queries and mutations scoped to an identity.
//!
//! Every operation resolves the caller's user record first (a missing user is
//! a `UserNotFound`, never an empty result), and every note access goes
//! through the `(id, owner)` lookup. Tag payloads and tag query parameters
//! are normalized before they reach storage.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Identity, Note, NoteInput, User};
use crate::tags::{distinct_union, normalize_distinct, normalize_tag, normalize_tag_args, normalize_tags};
use crate::traits::{NoteRepository, UserRepository};

/// Note query engine and mutation service.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    users: Arc<dyn UserRepository>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { notes, users }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Fetch one note owned by `owner`.
    pub async fn find_by_id(&self, id: Uuid, owner: &Identity) -> Result<Note> {
        let user = self.current_user(owner).await?;
        let note = self.owned_note(id, &user).await?;
        debug!(subsystem = "notes", op = "find_by_id", note_id = %id, user = %owner, "Note fetched");
        Ok(note)
    }

    /// All notes owned by `owner`.
    pub async fn find_all_for_user(&self, owner: &Identity) -> Result<Vec<Note>> {
        let user = self.current_user(owner).await?;
        let notes = self.notes.find_by_owner(&user).await?;
        debug!(
            subsystem = "notes",
            op = "find_all_for_user",
            user = %owner,
            result_count = notes.len(),
            "Notes listed"
        );
        Ok(notes)
    }

    /// Notes with at least one tag containing `tag_part` (case-insensitive).
    pub async fn find_by_tag_substring(&self, tag_part: &str, owner: &Identity) -> Result<Vec<Note>> {
        let user = self.current_user(owner).await?;
        let substring = normalize_tag(tag_part);
        let notes = self
            .notes
            .find_by_tag_substring_and_owner(&substring, &user)
            .await?;
        debug!(
            subsystem = "notes",
            op = "find_by_tag_substring",
            user = %owner,
            tag_part = %substring,
            result_count = notes.len(),
            "Notes searched by tag part"
        );
        Ok(notes)
    }

    /// Notes whose tag set is a superset of `tags` (case-insensitive).
    ///
    /// An empty query matches nothing.
    pub async fn find_by_all_tags<S: AsRef<str>>(&self, tags: &[S], owner: &Identity) -> Result<Vec<Note>> {
        let user = self.current_user(owner).await?;
        let wanted = normalize_distinct(tags);
        if wanted.is_empty() {
            debug!(subsystem = "notes", op = "find_by_all_tags", user = %owner, "Empty tag query");
            return Ok(Vec::new());
        }
        let notes = self
            .notes
            .find_matching_all_tags_and_owner(&wanted, wanted.len() as i64, &user)
            .await?;
        debug!(
            subsystem = "notes",
            op = "find_by_all_tags",
            user = %owner,
            tag_count = wanted.len(),
            result_count = notes.len(),
            "Notes searched by tags"
        );
        Ok(notes)
    }

    /// Distinct tags across the owner's notes in first-seen order.
    pub async fn distinct_tags_for_user(&self, owner: &Identity) -> Result<Vec<String>> {
        let user = self.current_user(owner).await?;
        let notes = self.notes.find_by_owner(&user).await?;
        if notes.is_empty() {
            debug!(subsystem = "notes", op = "distinct_tags", user = %owner, "User has no notes");
            return Ok(Vec::new());
        }
        let tags = distinct_union(notes.iter().map(|n| n.tags.as_slice()));
        debug!(
            subsystem = "notes",
            op = "distinct_tags",
            user = %owner,
            tag_count = tags.len(),
            "Tags aggregated"
        );
        Ok(tags)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a note owned by `owner`.
    pub async fn create(&self, input: NoteInput, owner: &Identity) -> Result<Note> {
        let user = self.current_user(owner).await?;
        let now = Utc::now();
        let note = Note {
            id: Uuid::now_v7(),
            user_id: user.id,
            text: input.text,
            tags: normalize_tags(input.tags),
            created_at_utc: now,
            updated_at_utc: now,
        };
        let saved = self.notes.save(note).await?;
        info!(subsystem = "notes", op = "create", note_id = %saved.id, user = %owner, "Note created");
        Ok(saved)
    }

    /// Replace text and tags of an owned note.
    pub async fn edit(&self, id: Uuid, input: NoteInput, owner: &Identity) -> Result<Note> {
        let user = self.current_user(owner).await?;
        let mut note = self.owned_note(id, &user).await?;
        note.text = input.text;
        note.tags = normalize_tags(input.tags);
        note.updated_at_utc = Utc::now();
        let saved = self.notes.save(note).await?;
        info!(subsystem = "notes", op = "edit", note_id = %id, user = %owner, "Note edited");
        Ok(saved)
    }

    /// Append tags to an owned note. No tags is a no-op returning the note.
    pub async fn add_tags<S: AsRef<str>>(&self, id: Uuid, owner: &Identity, tags: &[S]) -> Result<Note> {
        let user = self.current_user(owner).await?;
        let mut note = self.owned_note(id, &user).await?;
        if tags.is_empty() {
            warn!(subsystem = "notes", op = "add_tags", note_id = %id, "No tags provided");
            return Ok(note);
        }
        let tags = normalize_tag_args(tags);
        let tag_count = tags.len();
        note.add_tags(tags);
        note.updated_at_utc = Utc::now();
        let saved = self.notes.save(note).await?;
        info!(subsystem = "notes", op = "add_tags", note_id = %id, tag_count, "Tags added");
        Ok(saved)
    }

    /// Remove the first occurrence of each tag. No tags is a no-op returning the note.
    pub async fn remove_tags<S: AsRef<str>>(&self, id: Uuid, owner: &Identity, tags: &[S]) -> Result<Note> {
        let user = self.current_user(owner).await?;
        let mut note = self.owned_note(id, &user).await?;
        if tags.is_empty() {
            warn!(subsystem = "notes", op = "remove_tags", note_id = %id, "No tags provided");
            return Ok(note);
        }
        let tags = normalize_tag_args(tags);
        note.remove_tags(&tags);
        note.updated_at_utc = Utc::now();
        let saved = self.notes.save(note).await?;
        info!(
            subsystem = "notes",
            op = "remove_tags",
            note_id = %id,
            tag_count = tags.len(),
            "Tags removed"
        );
        Ok(saved)
    }

    /// Delete an owned note.
    pub async fn delete(&self, id: Uuid, owner: &Identity) -> Result<()> {
        let user = self.current_user(owner).await?;
        let note = self.owned_note(id, &user).await?;
        self.notes.delete(&note).await?;
        info!(subsystem = "notes", op = "delete", note_id = %id, user = %owner, "Note deleted");
        Ok(())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn current_user(&self, owner: &Identity) -> Result<User> {
        match self.users.find_by_email(owner.as_str()).await? {
            Some(user) => Ok(user),
            None => {
                warn!(subsystem = "notes", user = %owner, "User not found");
                Err(Error::UserNotFound(owner.to_string()))
            }
        }
    }

    async fn owned_note(&self, id: Uuid, user: &User) -> Result<Note> {
        match self.notes.find_by_id_and_owner(id, user).await? {
            Some(note) => Ok(note),
            None => {
                warn!(subsystem = "notes", note_id = %id, "Note not found");
                Err(Error::NoteNotFound(id))
            }
        }
    }
}
