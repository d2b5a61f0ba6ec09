pub mod auth;
pub mod extract;
pub mod health;
pub mod mentees;
pub mod mentors;
pub mod messages;
pub mod middleware;
pub mod requests;
pub mod rest;
pub mod sessions;
pub mod state;
pub mod users;
pub mod views;

pub use middleware::require_auth;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::rest::ApiDoc;
use crate::web::state::AppState;

/// Trims `value` and drops it when nothing is left.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid CORS_ORIGIN '{}': {}", origin, e);
            cors
        }
    }
}

/// Builds the complete application: the `/api` routes, `/health` and the Swagger UI.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/mentors", get(mentors::list_mentors_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/mentors", post(mentors::create_mentor_profile_handler))
        .route("/mentees", post(mentees::create_mentee_profile_handler))
        .route(
            "/users/profile",
            get(users::get_own_profile_handler).patch(users::update_own_profile_handler),
        )
        .route(
            "/users/{id}",
            get(users::get_user_handler).patch(users::update_user_handler),
        )
        .route(
            "/mentorship-requests",
            get(requests::list_requests_handler).post(requests::create_request_handler),
        )
        .route(
            "/mentorship-requests/{id}",
            patch(requests::update_request_handler).delete(requests::delete_request_handler),
        )
        .route(
            "/sessions",
            get(sessions::list_sessions_handler).post(sessions::create_session_handler),
        )
        .route(
            "/sessions/{id}",
            get(sessions::get_session_handler)
                .patch(sessions::update_session_handler)
                .delete(sessions::cancel_session_handler),
        )
        .route(
            "/messages",
            get(messages::list_messages_handler).post(messages::send_message_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes);

    Router::new()
        .nest("/api", api_router)
        .route("/health", get(health::health_handler))
        .layer(cors_layer(&state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_drops_blanks() {
        assert_eq!(non_empty(Some("  Lagos ".into())), Some("Lagos".to_string()));
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
