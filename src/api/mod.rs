//! HTTP surface: a single envelope endpoint plus small help pages.

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config.read().await;
        config.server.cors_allowed_origins.clone()
    };

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(index))
        .route("/soap", get(soap_help))
        .route("/soap", post(soap_endpoint))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// The envelope endpoint. The body is treated as one opaque payload;
/// the dispatcher decides everything else, including the status code.
async fn soap_endpoint(State(state): State<Arc<AppState>>, body: String) -> Response {
    let reply = state.dispatcher.handle(&body).await;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/xml")],
        reply.body,
    )
        .into_response()
}

async fn index() -> Html<&'static str> {
    Html(
        "<h1>notarr envelope API</h1>\
         <p>The endpoint is available at: <a href=\"/soap\">/soap</a></p>",
    )
}

async fn soap_help() -> Html<&'static str> {
    Html(
        "<h1>notarr envelope API endpoint</h1>\
         <p>This endpoint only accepts POST requests with an XML envelope in the request body.</p>",
    )
}
