use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
};
use linkproxy_config::CorsConfig;
use linkproxy_ui::static_assets::StaticAssetsInitializer;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    controllers::{
        accounts::AccountsController, connection::ConnectionController,
        institution::InstitutionController, link::LinkController,
    },
    error::Error,
    middlewares::session::SessionLayer,
    state::AppState,
};

pub fn init_router(
    app_state: &AppState,
    session_layer: SessionLayer,
    asset_handler: StaticAssetsInitializer,
) -> Result<Router, Error> {
    let router = Router::new()
        .merge(ConnectionController::router())
        .merge(InstitutionController::router())
        .merge(LinkController::router())
        .merge(AccountsController::router())
        .with_state(app_state.clone());

    // The frontend answers whatever the api doesn't, behind the same middleware
    let router = asset_handler.after_routes(router)?;

    Ok(router.layer(ServiceBuilder::new().layer((
        TraceLayer::new_for_http(),
        // Graceful shutdown will wait for outstanding requests to complete. Add a timeout so
        // requests don't hang forever.
        TimeoutLayer::new(Duration::from_secs(30)),
        cors_layer(&app_state.config.cors),
        session_layer,
    ))))
}

/// Any origin for `["*"]`, otherwise the listed origins with credentials so
/// the session cookie is sent cross-origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let is_wildcard = config.allowed_origins.iter().any(|origin| origin == "*");

    if is_wildcard {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid cors origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
}
