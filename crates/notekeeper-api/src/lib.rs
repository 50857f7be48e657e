//! # notekeeper-api
//!
//! HTTP surface for notekeeper: the bearer-token gate as axum middleware,
//! account and note handlers, and the OpenAPI document.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod query_types;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use notekeeper_core::defaults;

pub use config::ServerConfig;
pub use error::{ApiError, ApiJson};
pub use state::AppState;

use handlers::{health, notes, users};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Build the application router.
///
/// The auth middleware wraps every route, including docs and health, so the
/// path policy alone decides what is public.
pub fn create_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health_check))
        // Users
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        // Notes
        .route("/api/notes", post(notes::create_note))
        .route("/api/notes/user", get(notes::notes_for_user))
        .route("/api/notes/tagpart", get(notes::notes_by_tag_part))
        .route("/api/notes/tags", get(notes::notes_by_all_tags))
        .route("/api/notes/tags/all", get(notes::all_tags))
        .route(
            "/api/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/api/notes/:id/tags",
            post(notes::add_tags).delete(notes::remove_tags),
        );

    if state.docs_enabled {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        );
    }

    app.layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::require_auth,
    ))
    .layer(TraceLayer::new_for_http())
    .layer(PropagateRequestIdLayer::x_request_id())
    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
    .layer(RequestBodyLimitLayer::new(defaults::MAX_BODY_BYTES))
    .with_state(state)
}
