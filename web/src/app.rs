use linkproxy_config::Environment;
use linkproxy_ui::static_assets::StaticAssetsInitializer;
use tracing::{debug, info};

use axum::{Router, serve};
use color_eyre::Result;
use tokio::{net::TcpListener, signal};

use crate::{
    middlewares::session::SessionManager, router::init_router, state::AppState, tracing::Tracing,
};

pub struct App {
    pub router: Router,
    pub app_state: AppState,
}

impl App {
    // Builds the application without running it
    // this is useful for testing purposes
    // where axum_test will run a
    // random port
    pub async fn build(app_state: AppState) -> Result<Self> {
        let SessionManager { session_layer } = SessionManager::new(&app_state);

        // Initialize the static assets handler
        let asset_handler = StaticAssetsInitializer::init(&app_state.config);
        asset_handler.before_run()?;

        // Initialize the router
        let router = init_router(&app_state, session_layer, asset_handler)?;

        Ok(Self { router, app_state })
    }

    // Serves the application on the configured
    // ip and port.
    async fn serve(app: App) -> Result<()> {
        let listener = TcpListener::bind(&app.app_state.config.server.addr()).await?;

        info!(
            "listening on {}:{} against plaid at {}",
            app.app_state.config.server.host,
            app.app_state.config.server.port,
            app.app_state.config.plaid.base_url()
        );

        serve(listener, app.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server shutdown successfully");

        Ok(())
    }

    // Boots up the app on the configured binding
    // and port.
    pub async fn boot(env: Environment) -> Result<()> {
        color_eyre::install()?;

        let app_state = AppState::build(env).await?;

        Tracing::init(&app_state.config.tracing);
        debug!(environment = %app_state.env, plaid = ?app_state.config.plaid, "configuration loaded");

        let app = App::build(app_state).await?;

        App::serve(app).await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => debug!("received ctrl-c"),
        _ = terminate => debug!("received terminate signal"),
    }
}
