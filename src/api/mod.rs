mod audit;
pub mod auth;
mod error;
mod properties;
pub mod rate_limit;
mod requests;
mod validation;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes: registration and login are public, session management is
    // gated by the User extractor. All of them sit behind the tighter
    // auth-tier rate limit.
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/session", delete(auth::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_auth,
        ));

    // Marketplace routes. Handlers taking a `User` argument require a valid
    // bearer token; the two detail GETs are public.
    let api_routes = Router::new()
        // Properties
        .route(
            "/properties",
            get(properties::search_properties).post(properties::create_property),
        )
        .route("/properties/landlord", get(properties::list_landlord_properties))
        .route(
            "/properties/shortlisted",
            get(properties::list_shortlisted_properties),
        )
        .route(
            "/properties/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        )
        .route(
            "/properties/:id/shortlist",
            get(properties::check_shortlist)
                .post(properties::add_shortlist)
                .delete(properties::remove_shortlist),
        )
        // Rental requests
        .route("/requests", post(requests::create_request))
        .route("/requests/tenant", get(requests::list_tenant_requests))
        .route("/requests/landlord", get(requests::list_landlord_requests))
        .route(
            "/requests/:id",
            get(requests::get_request),
        )
        .route("/requests/:id/status", put(requests::update_request_status))
        // Audit trail
        .route("/audit-logs", get(audit::list_logs))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_api,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
