//! In-memory storage backend.
//!
//! Implements both repositories over a single `RwLock`ed state. Used when the
//! server runs with `STORAGE_BACKEND=memory` and by the test suites.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use notekeeper_core::{Error, Note, NoteRepository, Result, User, UserRepository};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    notes: Vec<Note>,
}

/// Process-local store for users and notes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes across all users.
    pub async fn note_count(&self) -> usize {
        self.state.read().await.notes.len()
    }

    async fn select<F>(&self, owner: &User, keep: F) -> Vec<Note>
    where
        F: Fn(&Note) -> bool,
    {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .iter()
            .filter(|n| n.user_id == owner.id && keep(n))
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            a.created_at_utc
                .cmp(&b.created_at_utc)
                .then_with(|| a.id.cmp(&b.id))
        });
        notes
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == email) {
            return Err(Error::DuplicateUser(email.to_string()));
        }
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at_utc: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn find_by_id_and_owner(&self, id: Uuid, owner: &User) -> Result<Option<Note>> {
        let state = self.state.read().await;
        Ok(state
            .notes
            .iter()
            .find(|n| n.id == id && n.user_id == owner.id)
            .cloned())
    }

    async fn find_by_owner(&self, owner: &User) -> Result<Vec<Note>> {
        Ok(self.select(owner, |_| true).await)
    }

    async fn find_by_tag_substring_and_owner(
        &self,
        substring: &str,
        owner: &User,
    ) -> Result<Vec<Note>> {
        Ok(self
            .select(owner, |n| n.tags.iter().any(|t| t.contains(substring)))
            .await)
    }

    async fn find_matching_all_tags_and_owner(
        &self,
        tags: &[String],
        tag_count: i64,
        owner: &User,
    ) -> Result<Vec<Note>> {
        Ok(self
            .select(owner, |n| {
                let mut matched: Vec<&String> = n.tags.iter().filter(|t| tags.contains(t)).collect();
                matched.sort();
                matched.dedup();
                matched.len() as i64 == tag_count
            })
            .await)
    }

    async fn save(&self, note: Note) -> Result<Note> {
        let mut state = self.state.write().await;
        match state.notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) if existing.user_id != note.user_id => Err(Error::NoteNotFound(note.id)),
            Some(existing) => {
                existing.text = note.text;
                existing.tags = note.tags;
                existing.updated_at_utc = note.updated_at_utc;
                Ok(existing.clone())
            }
            None => {
                state.notes.push(note.clone());
                Ok(note)
            }
        }
    }

    async fn delete(&self, note: &Note) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .notes
            .retain(|n| !(n.id == note.id && n.user_id == note.user_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_for(user: &User, tags: &[&str]) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::now_v7(),
            user_id: user.id,
            text: "text".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at_utc: now,
            updated_at_utc: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert("a@b.io", "hash").await.unwrap();
        let err = store.insert("a@b.io", "other").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateUser(_)));
    }

    #[tokio::test]
    async fn test_save_cannot_change_owner() {
        let store = MemoryStore::new();
        let alice = store.insert("alice@example.com", "h").await.unwrap();
        let bob = store.insert("bob@example.com", "h").await.unwrap();

        let note = store.save(note_for(&alice, &["A"])).await.unwrap();
        let mut stolen = note.clone();
        stolen.user_id = bob.id;

        assert!(matches!(
            store.save(stolen).await,
            Err(Error::NoteNotFound(_))
        ));
        assert!(store
            .find_by_id_and_owner(note.id, &alice)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_all_tags_counts_distinct_matches() {
        let store = MemoryStore::new();
        let user = store.insert("a@b.io", "h").await.unwrap();
        store.save(note_for(&user, &["A", "A"])).await.unwrap();
        let both = store.save(note_for(&user, &["A", "B", "C"])).await.unwrap();

        let tags = vec!["A".to_string(), "B".to_string()];
        let found = store
            .find_matching_all_tags_and_owner(&tags, 2, &user)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, both.id);
    }

    #[tokio::test]
    async fn test_delete_only_touches_owner_note() {
        let store = MemoryStore::new();
        let user = store.insert("a@b.io", "h").await.unwrap();
        let note = store.save(note_for(&user, &[])).await.unwrap();
        store.delete(&note).await.unwrap();
        assert_eq!(store.note_count().await, 0);
    }
}
