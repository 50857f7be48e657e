//! Core data models for notekeeper.
//!
//! These types are shared by the services, the storage backends and the
//! HTTP layer.

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern is valid")
});

// =============================================================================
// IDENTITY
// =============================================================================

/// Email-formatted user reference shared by tokens and note ownership.
///
/// This is the only user handle that crosses the authentication boundary;
/// storage ids stay inside the repositories and services.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Parse an identity from untrusted input (registration, login).
    pub fn parse_email(email: &str) -> Result<Self> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidInput("Email must not be blank".to_string()));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        Ok(Self(email.to_string()))
    }

    /// Wrap a subject taken from a verified token.
    pub fn from_subject(subject: impl Into<String>) -> Result<Self> {
        let subject = subject.into();
        if subject.is_empty() {
            return Err(Error::MalformedToken("token subject is empty".to_string()));
        }
        Ok(Self(subject))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// USER TYPES
// =============================================================================

/// A registered user as stored by the user repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Encoded credential produced by a [`crate::PasswordHasher`].
    pub password_hash: String,
    pub created_at_utc: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity(self.email.clone())
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note owned by exactly one user.
///
/// `tags` keeps insertion order and may contain duplicates; every entry is
/// already normalized when it reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub tags: Vec<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

impl Note {
    /// Append tags in the given order.
    pub fn add_tags<I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.tags.extend(tags);
    }

    /// Remove the first occurrence of each given tag; absent tags are ignored.
    pub fn remove_tags<'a, I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            if let Some(pos) = self.tags.iter().position(|t| t == tag) {
                self.tags.remove(pos);
            }
        }
    }
}

/// Text and tags supplied by the caller on create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub text: String,
    /// `None` and an empty list both mean "no tags".
    pub tags: Option<Vec<String>>,
}
