use crate::{controller::health_check_controller, AppState};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use log::*;
use service::config::Config;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::controller::person_controller;

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Person Stream API"
        ),
        paths(
            person_controller::index,
            person_controller::read,
            person_controller::abc,
            person_controller::aaa,
            person_controller::stream,
            person_controller::stream_all,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                domain::Person,
            )
        ),
        tags(
            (name = "person_stream", description = "Single value and streaming Person API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    let session_layer = session_layer(&app_state.config);
    let cors_layer = cors_layer(&app_state.config);

    Router::new()
        .merge(person_routes(app_state.clone()))
        .merge(health_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
        .layer(session_layer)
        .layer(cors_layer)
}

fn person_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/person", get(person_controller::index))
        // Static segments take priority over the `:id` capture
        .route("/person/abc", get(person_controller::abc))
        .route("/person/aaa", get(person_controller::aaa))
        .route("/person/sse", get(person_controller::stream))
        .route("/person/all", get(person_controller::stream_all))
        .route("/person/:id", get(person_controller::read))
        .with_state(app_state)
}

fn health_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_controller::health_check))
        .with_state(app_state)
}

// Sessions live in process memory; they only back the `code` value of /person/aaa.
fn session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    let expiry_seconds = i64::try_from(config.session_expiry_seconds).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.is_production())
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(expiry_seconds)))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
}
