use std::env;

use apipub_server::config::loader::{DEFAULT_CONFIG_PATH, load_config};
use apipub_server::{AppState, ServerBuilder, observability};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    CliArgument,
    EnvironmentVariable,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (APIPUB_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: Failed to load .env file: {e}");
    }

    observability::init_tracing();

    let (config_path, source) = resolve_config_path();
    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = observability::apply_logging_level(&cfg.logging.level) {
        tracing::warn!(error = %e, "Keeping default log level");
    }
    tracing::info!(
        path = %config_path,
        source = %source,
        control_plane = %cfg.control_plane.endpoint,
        region = %cfg.control_plane.region,
        template = %cfg.template.path.display(),
        "Configuration loaded"
    );

    let state = match AppState::from_config(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Backend initialization failed: {e}");
            std::process::exit(2);
        }
    };

    let server = ServerBuilder::new(state).with_addr(cfg.addr()).build();
    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: APIPUB_CONFIG
/// 3. Default: apipub.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }

    if let Ok(path) = env::var("APIPUB_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}
