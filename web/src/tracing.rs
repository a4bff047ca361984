use linkproxy_config::TracingConfig;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tracing_subscriber::{Layer, Registry, fmt};

pub struct Tracing;

impl Tracing {
    /// Installs the global subscriber, `RUST_LOG` takes precedence over the configured filter.
    ///
    /// Installing twice is a no-op so tests can call this freely.
    pub fn init(config: &TracingConfig) {
        let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();

        if config.enable {
            layers.push(
                fmt::Layer::default()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stdout)
                    .compact()
                    .boxed(),
            );
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.env_filter));

        if tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .with(ErrorLayer::default())
            .try_init()
            .is_err()
        {
            tracing::debug!("tracing subscriber already installed");
        }
    }
}
