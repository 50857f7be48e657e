//! Note repository implementation.
//!
//! Tags live in an ordered `TEXT[]` column on `note`, so a note and its tags
//! are read and written in one statement.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notekeeper_core::{Error, Note, NoteRepository, Result, User};

use crate::escape_like;

const NOTE_COLUMNS: &str = "id, user_id, text, tags, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn note_from_row(row: &PgRow) -> Note {
    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        text: row.get("text"),
        tags: row.get("tags"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn find_by_id_and_owner(&self, id: Uuid, owner: &User) -> Result<Option<Note>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM note WHERE id = $1 AND user_id = $2",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn find_by_owner(&self, owner: &User) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM note WHERE user_id = $1 ORDER BY created_at_utc, id",
            NOTE_COLUMNS
        ))
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn find_by_tag_substring_and_owner(
        &self,
        substring: &str,
        owner: &User,
    ) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM note n
            WHERE n.user_id = $1
              AND EXISTS (
                  SELECT 1 FROM unnest(n.tags) AS t(tag)
                  WHERE t.tag LIKE '%' || $2 || '%' ESCAPE '\'
              )
            ORDER BY n.created_at_utc, n.id
            "#,
            NOTE_COLUMNS
        ))
        .bind(owner.id)
        .bind(escape_like(substring))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn find_matching_all_tags_and_owner(
        &self,
        tags: &[String],
        tag_count: i64,
        owner: &User,
    ) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM note n
            WHERE n.user_id = $1
              AND (
                  SELECT COUNT(DISTINCT t.tag)
                  FROM unnest(n.tags) AS t(tag)
                  WHERE t.tag = ANY($2)
              ) = $3
            ORDER BY n.created_at_utc, n.id
            "#,
            NOTE_COLUMNS
        ))
        .bind(owner.id)
        .bind(tags.to_vec())
        .bind(tag_count)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn save(&self, note: Note) -> Result<Note> {
        // The conflict branch only fires for the same owner, so a note can
        // never be moved to another user.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO note (id, user_id, text, tags, created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
                SET text = EXCLUDED.text,
                    tags = EXCLUDED.tags,
                    updated_at_utc = EXCLUDED.updated_at_utc
                WHERE note.user_id = EXCLUDED.user_id
            RETURNING {}
            "#,
            NOTE_COLUMNS
        ))
        .bind(note.id)
        .bind(note.user_id)
        .bind(&note.text)
        .bind(&note.tags)
        .bind(note.created_at_utc)
        .bind(note.updated_at_utc)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref()
            .map(note_from_row)
            .ok_or(Error::NoteNotFound(note.id))
    }

    async fn delete(&self, note: &Note) -> Result<()> {
        sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(note.id)
            .bind(note.user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
