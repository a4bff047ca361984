use std::sync::Arc;

use color_eyre::Result;
use linkproxy_config::{Config, Environment, load_config};
use linkproxy_plaid::PlaidClient;
use tower_sessions::cookie::Key;
use tracing::warn;

use crate::{
    clock::{Clock, SystemClock},
    error::Error,
};

/// The application's state that is available in [`crate::controllers`] and [`crate::middlewares`].
#[derive(Clone)]
pub struct AppState {
    pub env: Environment,
    pub config: Config,
    pub plaid: PlaidClient,
    pub clock: Arc<dyn Clock>,
    pub session_key: Key,
}

impl AppState {
    pub async fn build(env: Environment) -> Result<Self, Error> {
        let config: Config = load_config(&env)?;

        Self::from_config(env, config)
    }

    pub fn from_config(env: Environment, config: Config) -> Result<Self, Error> {
        let plaid = PlaidClient::new(&config.plaid)?;
        let session_key = session_key(&config)?;

        Ok(Self {
            env,
            config,
            plaid,
            clock: Arc::new(SystemClock),
            session_key,
        })
    }
}

fn session_key(config: &Config) -> Result<Key, Error> {
    match config.session.secret {
        Some(ref secret) => Key::try_from(secret.as_bytes()).map_err(|_| Error::SessionSecret),
        None => {
            warn!("no session secret configured, generating one for this process");
            Ok(Key::generate())
        }
    }
}
