//! Note CRUD, tag mutation and tag query handlers.
//!
//! Every handler requires an [`AuthenticatedUser`]; all lookups are scoped to
//! that identity, so another user's note is indistinguishable from a missing one.

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use notekeeper_core::{Identity, Note, NoteInput};

use crate::middleware::AuthenticatedUser;
use crate::query_types::{TagList, TagPartQuery};
use crate::{ApiError, ApiJson, AppState};

/// Text and tags of a note on create and update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NoteRequest {
    pub text: String,
    /// Omitted, `null` and `[]` all mean no tags.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl From<NoteRequest> for NoteInput {
    fn from(req: NoteRequest) -> Self {
        NoteInput {
            text: req.text,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    pub id: Uuid,
    /// Owner's email.
    pub user_email: String,
    pub text: String,
    /// Normalized tags in insertion order.
    pub tags: Vec<String>,
}

impl NoteResponse {
    fn new(note: Note, owner: &Identity) -> Self {
        Self {
            id: note.id,
            user_email: owner.to_string(),
            text: note.text,
            tags: note.tags,
        }
    }

    fn list(notes: Vec<Note>, owner: &Identity) -> Vec<Self> {
        notes.into_iter().map(|n| Self::new(n, owner)).collect()
    }
}

fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid note id", raw)))
}

/// Create a note.
///
/// POST /api/notes
#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    security(("bearerAuth" = [])),
    request_body = NoteRequest,
    responses((status = 201, description = "Note created", body = NoteResponse)))]
pub async fn create_note(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    ApiJson(req): ApiJson<NoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    let note = state.notes.create(req.into(), &owner).await?;
    Ok((StatusCode::CREATED, Json(NoteResponse::new(note, &owner))))
}

/// Fetch one of the caller's notes.
///
/// GET /api/notes/{id}
#[utoipa::path(get, path = "/api/notes/{id}", tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note", body = NoteResponse),
        (status = 404, description = "No such note for this user", body = crate::error::ErrorBody)
    ))]
pub async fn get_note(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
    let id = parse_note_id(&id)?;
    let note = state.notes.find_by_id(id, &owner).await?;
    Ok(Json(NoteResponse::new(note, &owner)))
}

/// Replace a note's text and tags.
///
/// PUT /api/notes/{id}
#[utoipa::path(put, path = "/api/notes/{id}", tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = NoteRequest,
    responses((status = 200, description = "Note updated", body = NoteResponse)))]
pub async fn update_note(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NoteRequest>,
) -> Result<Json<NoteResponse>, ApiError> {
    let id = parse_note_id(&id)?;
    let note = state.notes.edit(id, req.into(), &owner).await?;
    Ok(Json(NoteResponse::new(note, &owner)))
}

/// Delete a note.
///
/// DELETE /api/notes/{id}
#[utoipa::path(delete, path = "/api/notes/{id}", tag = "Notes",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Note id")),
    responses((status = 204, description = "Note deleted")))]
pub async fn delete_note(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_note_id(&id)?;
    state.notes.delete(id, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append tags to a note.
///
/// POST /api/notes/{id}/tags with a JSON array body
#[utoipa::path(post, path = "/api/notes/{id}/tags", tag = "Tags",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = Vec<String>,
    responses((status = 200, description = "Note with added tags", body = NoteResponse)))]
pub async fn add_tags(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<NoteResponse>, ApiError> {
    let id = parse_note_id(&id)?;
    let tags = TagList::from_json_body(&body).map_err(ApiError::BadRequest)?;
    let note = state.notes.add_tags(id, &owner, tags.as_slice()).await?;
    Ok(Json(NoteResponse::new(note, &owner)))
}

/// Remove the first occurrence of each tag from a note.
///
/// DELETE /api/notes/{id}/tags with a JSON array body
#[utoipa::path(delete, path = "/api/notes/{id}/tags", tag = "Tags",
    security(("bearerAuth" = [])),
    params(("id" = Uuid, Path, description = "Note id")),
    request_body = Vec<String>,
    responses((status = 200, description = "Note with tags removed", body = NoteResponse)))]
pub async fn remove_tags(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<NoteResponse>, ApiError> {
    let id = parse_note_id(&id)?;
    let tags = TagList::from_json_body(&body).map_err(ApiError::BadRequest)?;
    let note = state.notes.remove_tags(id, &owner, tags.as_slice()).await?;
    Ok(Json(NoteResponse::new(note, &owner)))
}

/// Notes carrying every requested tag.
///
/// GET /api/notes/tags?tags=a&tags=b
#[utoipa::path(get, path = "/api/notes/tags", tag = "Tags",
    security(("bearerAuth" = [])),
    params(("tags" = Vec<String>, Query, description = "Repeated or comma-separated tags")),
    responses((status = 200, description = "Matching notes", body = [NoteResponse])))]
pub async fn notes_by_all_tags(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let tags = TagList::from_query(query.as_deref(), "tags").map_err(ApiError::BadRequest)?;
    let notes = state.notes.find_by_all_tags(tags.as_slice(), &owner).await?;
    Ok(Json(NoteResponse::list(notes, &owner)))
}

/// Notes with a tag containing `tagpart`.
///
/// GET /api/notes/tagpart?tagpart=x
#[utoipa::path(get, path = "/api/notes/tagpart", tag = "Tags",
    security(("bearerAuth" = [])),
    params(("tagpart" = String, Query, description = "Case-insensitive tag substring")),
    responses((status = 200, description = "Matching notes", body = [NoteResponse])))]
pub async fn notes_by_tag_part(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
    Query(query): Query<TagPartQuery>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let tag_part = query
        .tagpart
        .ok_or_else(|| ApiError::BadRequest("Missing query parameter 'tagpart'".to_string()))?;
    let notes = state.notes.find_by_tag_substring(&tag_part, &owner).await?;
    Ok(Json(NoteResponse::list(notes, &owner)))
}

/// All of the caller's notes.
///
/// GET /api/notes/user
#[utoipa::path(get, path = "/api/notes/user", tag = "Notes",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "The caller's notes", body = [NoteResponse])))]
pub async fn notes_for_user(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = state.notes.find_all_for_user(&owner).await?;
    Ok(Json(NoteResponse::list(notes, &owner)))
}

/// Distinct tags across the caller's notes.
///
/// GET /api/notes/tags/all
#[utoipa::path(get, path = "/api/notes/tags/all", tag = "Tags",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Distinct tags", body = [String])))]
pub async fn all_tags(
    State(state): State<AppState>,
    AuthenticatedUser(owner): AuthenticatedUser,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.notes.distinct_tags_for_user(&owner).await?))
}
