use std::path::{Path, PathBuf};

use axum::Router;
use linkproxy_config::Config;
use tower_http::services::ServeDir;

use crate::Error;

/// Serves the browser frontend that drives Plaid Link.
pub struct StaticAssetsInitializer {
    path: PathBuf,
}

impl StaticAssetsInitializer {
    pub fn init(config: &Config) -> Self {
        let path =
            Path::new(env!("CARGO_MANIFEST_DIR")).join(Path::new(&config.static_assets.path));

        Self { path }
    }
}

impl StaticAssetsInitializer {
    pub fn name(&self) -> String {
        "static-assets".to_string()
    }

    pub fn before_run(&self) -> Result<(), Error> {
        tracing::info!("Initializing {} handler at {}", self.name(), self.path.display());

        if !self.path.is_dir() {
            return Err(Error::MissingDirectory(self.path.clone()));
        }

        Ok(())
    }

    /// Anything the api routes don't match falls through to the frontend,
    /// with `/` answered by `index.html`.
    ///
    /// Must run before the router's middleware is layered on, or the
    /// fallback bypasses it.
    pub fn after_routes<S>(self, router: Router<S>) -> Result<Router<S>, Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        Ok(router.fallback_service(ServeDir::new(self.path.as_path())))
    }
}
