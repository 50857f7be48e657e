//! OpenAPI document served at `/api-docs/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorBody;
use crate::handlers::{
    health,
    notes::{self, NoteRequest, NoteResponse},
    users::{self, CredentialsRequest, TokenResponse, UserResponse},
};

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAuth),
    info(
        title = "notekeeper API",
        description = "Bearer-token authenticated notes with normalized tags"
    ),
    tags(
        (name = "Users", description = "Registration and login"),
        (name = "Notes", description = "Note CRUD operations"),
        (name = "Tags", description = "Tag mutation and tag queries"),
        (name = "System", description = "Health checks")
    ),
    paths(
        health::health_check,
        users::register,
        users::login,
        notes::create_note,
        notes::get_note,
        notes::update_note,
        notes::delete_note,
        notes::add_tags,
        notes::remove_tags,
        notes::notes_by_all_tags,
        notes::notes_by_tag_part,
        notes::notes_for_user,
        notes::all_tags,
    ),
    components(schemas(
        CredentialsRequest,
        UserResponse,
        TokenResponse,
        NoteRequest,
        NoteResponse,
        ErrorBody
    ))
)]
pub struct ApiDoc;

/// Registers the `bearerAuth` scheme referenced by the note endpoints.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/users/register",
            "/api/users/login",
            "/api/notes",
            "/api/notes/{id}",
            "/api/notes/{id}/tags",
            "/api/notes/tags",
            "/api/notes/tagpart",
            "/api/notes/user",
            "/api/notes/tags/all",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_note_routes_require_bearer_auth() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearerAuth"));

        let json = serde_json::to_value(&doc).unwrap();
        let secured = |path: &str, method: &str| {
            json["paths"][path][method]["security"][0]
                .get("bearerAuth")
                .is_some()
        };
        assert!(secured("/api/notes", "post"));
        assert!(secured("/api/notes/{id}", "delete"));
        assert!(secured("/api/notes/{id}/tags", "post"));
        assert!(secured("/api/notes/tags/all", "get"));
        assert!(!secured("/api/users/login", "post"));
        assert!(!secured("/health", "get"));
    }
}
