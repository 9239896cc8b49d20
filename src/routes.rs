use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::check_auth;
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let routes = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/login", post(public::login))
        // Protected
        .merge(protected_routes(state.clone()));

    with_global_layers(routes, config).with_state(state)
}

/// Body limit, panic recovery, CORS and request tracing
fn with_global_layers(routes: Router<AppState>, config: &AppConfig) -> Router<AppState> {
    routes
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::new())
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{group, user};

    Router::new()
        .route("/user", get(user::search).post(user::create))
        .route(
            "/user/:id",
            get(user::get).put(user::update).delete(user::remove),
        )
        .route("/group", get(group::search).post(group::create))
        .route(
            "/group/:id",
            get(group::get).put(group::update).delete(group::remove),
        )
        .route_layer(middleware::from_fn_with_state(state, check_auth))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
