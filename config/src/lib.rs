use std::{
    env,
    fmt::{Display, Formatter},
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use dotenvy::dotenv;
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

/// The application configuration.
///
/// This struct is the central point for the entire application configuration. It holds the [`ServerConfig`], [`TracingConfig`], [`PlaidConfig`] and [`SessionConfig`] as well as [`StaticAssetsConfig`] and [`CorsConfig`], read from the main `app.toml` and the environment-specific configuration files.
///
/// For any setting that appears in both the `app.toml` and the environment-specific file, the latter will override the former so that default settings can be kept in `app.toml` that are overridden per environment if necessary.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub tracing: TracingConfig,
    pub static_assets: StaticAssetsConfig,
    pub plaid: PlaidConfig,
    pub session: SessionConfig,
    pub cors: CorsConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct AppConfig {
    /// The name of the app which can be presented in the UI
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Link Proxy".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ServerConfig {
    /// The port to bind to, e.g. 8000
    pub port: u16,

    /// The ip to bind to, e.g. 127.0.0.1 or ::1
    pub ip: IpAddr,

    /// The host to bind to, e.g. "localhost"
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8000,
            host: "http://localhost".to_string(),
        }
    }
}

impl ServerConfig {
    /// Returns the full address the server binds to, including both the ip and port.
    ///
    /// This can be used when creating a TCP Listener:
    ///
    /// ```rust
    /// let config: Config = load_config(Environment::Development);
    /// let listener = TcpListener::bind(&config.server.addr()).await?;
    /// serve(listener, app.into_make_service()).await?;
    ///  ```
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct StaticAssetsConfig {
    /// The path to the static frontend directory e.g. public
    pub path: String,
}

impl Default for StaticAssetsConfig {
    fn default() -> Self {
        Self {
            path: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct TracingConfig {
    pub enable: bool,
    pub env_filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enable: true,
            env_filter: "info,linkproxy_web=debug,linkproxy_plaid=debug,tower_http=debug"
                .to_string(),
        }
    }
}

/// The Plaid environment the client talks to.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct PlaidConfig {
    pub env: PlaidEnvironment,
    pub client_id: String,
    pub secret: String,
    /// Overrides the url derived from `env`, e.g. to point at a stub server.
    pub base_url: Option<String>,
    /// Upstream request timeout in milliseconds.
    pub timeout: u64,
    /// Shown to the user inside Plaid Link.
    pub client_name: String,
    pub android_package_name: Option<String>,
    pub redirect_uri: Option<String>,
}

impl Default for PlaidConfig {
    fn default() -> Self {
        Self {
            env: PlaidEnvironment::default(),
            client_id: String::new(),
            secret: String::new(),
            base_url: None,
            timeout: 10_000,
            client_name: "Link Proxy".to_string(),
            android_package_name: None,
            redirect_uri: None,
        }
    }
}

impl PlaidConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.env.base_url())
    }
}

// Manual implementation of Debug for PlaidConfig to redact the secret
impl std::fmt::Debug for PlaidConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaidConfig")
            .field("env", &self.env)
            .field("client_id", &self.client_id)
            .field("secret", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("client_name", &self.client_name)
            .field("android_package_name", &self.android_package_name)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct SessionConfig {
    /// Key material used to sign the session cookie, at least 64 bytes.
    ///
    /// A random key is generated at boot when this is not set or blank.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub secret: Option<String>,
    /// Only send the session cookie over https.
    pub secure: bool,
    /// Days of inactivity after which a session expires.
    pub expiry_days: i64,
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            secure: false,
            expiry_days: 1,
            cookie_name: "id".to_string(),
        }
    }
}

/// `SESSION_SECRET=` in a `.env` file means no secret, not an empty one.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|secret| !secret.trim().is_empty()))
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .field("secure", &self.secure)
            .field("expiry_days", &self.expiry_days)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct CorsConfig {
    /// Allowed origins, `["*"]` allows any.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Loads the application configuration for a particular environment.
///
/// Depending on the environment, this function will behave differently:
/// * for [`Environment::Development`], the function will load env vars from a `.env` file at the project root if that is present
/// * for [`Environment::Test`], the function will load env vars from a `.env.test` file at the project root if that is present
/// * for [`Environment::Staging`], the function will only use the process env vars, and not load a `.env` file
/// * for [`Environment::Production`], the function will only use the process env vars, and not load a `.env` file
///
/// In case the .env or .env.test files live in another directory,
/// you can set that location using the APP_DOTENV_CONFIG_DIR environment variable.
/// This is useful when they are mounted at separate locations in a Docker container, for example.
///
/// Configuration settings are loaded from these sources (in that order so that latter sources override former):
/// * the built-in defaults
/// * the `config/app.toml` file
/// * the `config/environments/<development|staging|production|test>.toml` files depending on the environment
/// * the plain `PLAID_CLIENT_ID`, `PLAID_SECRET`, `PLAID_ENV`, `SESSION_SECRET`, `APP_PORT` and `PORT` variables
/// * environment variables prefixed with `APP_`, nested with `__`, e.g. `APP_PLAID__SECRET`
pub fn load_config<'a, T>(env: &Environment) -> Result<T, Error>
where
    T: Deserialize<'a>,
{
    let dotenv_config_dir = env::var("APP_DOTENV_CONFIG_DIR")
        .ok()
        .map(std::path::PathBuf::from);

    match (env, dotenv_config_dir) {
        (Environment::Development, None) => {
            dotenv().ok();
        }
        (Environment::Test, None) => {
            dotenvy::from_filename(".env.test").ok();
        }
        (Environment::Development, Some(mut dotenv_config_dir)) => {
            dotenv_config_dir.push(".env");
            dotenvy::from_filename(dotenv_config_dir).ok();
        }
        (Environment::Test, Some(mut dotenv_config_dir)) => {
            dotenv_config_dir.push(".env.test");
            dotenvy::from_filename(dotenv_config_dir).ok();
        }
        _ => { /* don't use any .env file for production */ }
    }

    figment(env).extract().map_err(Error::from)
}

fn figment(env: &Environment) -> Figment {
    let env_config_file = match env {
        Environment::Development => "development.toml",
        Environment::Staging => "staging.toml",
        Environment::Production => "production.toml",
        Environment::Test => "test.toml",
    };

    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file("config/app.toml"))
        .merge(Toml::file(format!(
            "config/environments/{}",
            env_config_file
        )))
        .merge(
            Env::raw()
                .only(&["PLAID_CLIENT_ID", "PLAID_SECRET", "PLAID_ENV"])
                .map(|key| {
                    let field = key.as_str()["PLAID_".len()..].to_ascii_lowercase();
                    format!("plaid.{}", field).into()
                }),
        )
        .merge(
            Env::raw()
                .only(&["SESSION_SECRET"])
                .map(|_| "session.secret".into()),
        )
        .merge(
            Env::raw()
                .only(&["APP_PORT", "PORT"])
                .map(|_| "server.port".into()),
        )
        .merge(Env::prefixed("APP_").split("__"))
}

/// The environment the application runs in.
///
/// The application can run in 4 different environments: development, staging, production, and test. Depending on the environment, the configuration might be different (e.g. a different Plaid environment) or the application might behave differently.
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// The development environment is what developers would use locally.
    Development,
    /// The staging environment would typically be used in a staging deployment of the app.
    Staging,
    /// The production environment would typically be used in the released, user-facing deployment of the app.
    Production,
    /// The test environment is using when running e.g. `cargo test`
    Test,
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
            Environment::Test => write!(f, "test"),
        }
    }
}

/// Returns the currently active environment.
///
/// If the `APP_ENVIRONMENT` env var is set, the application environment is parsed from that (which might fail if an invalid environment is set). If the env var is not set, [`Environment::Development`] is returned.
pub fn get_env() -> Result<Environment, Error> {
    match env::var("APP_ENVIRONMENT") {
        Ok(val) => {
            info!(r#"Setting environment from APP_ENVIRONMENT: "{}""#, val);
            parse_env(&val)
        }
        Err(_) => {
            info!("Defaulting to environment: development");
            Ok(Environment::Development)
        }
    }
}

/// Parses an [`Environment`] from a string.
///
/// The environment can be passed in different forms, e.g. "dev", "development", "prod", etc. If an invalid environment is passed, an error is returned.
pub fn parse_env(env: &str) -> Result<Environment, Error> {
    let env = &env.to_lowercase();
    match env.as_str() {
        "dev" => Ok(Environment::Development),
        "development" => Ok(Environment::Development),
        "stage" => Ok(Environment::Staging),
        "staging" => Ok(Environment::Staging),
        "test" => Ok(Environment::Test),
        "prod" => Ok(Environment::Production),
        "production" => Ok(Environment::Production),
        unknown => Err(Error::InvalidEnvironment(format!(
            "Unknown environment: {}",
            unknown
        ))),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Merge(#[from] figment::Error),
    #[error("unknown environment")]
    InvalidEnvironment(String),
}
