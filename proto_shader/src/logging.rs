//! Logger setup for binaries built on this crate.
use env_logger::Env;

/// Filter used when neither the config nor `RUST_LOG` say otherwise
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `env_logger` directives (e.g. "warn,proto_shader=debug") applied when
    /// `RUST_LOG` is not set
    pub fallback_filter: String,
}

impl LoggingConfig {
    pub fn new() -> Self {
        LoggingConfig {
            fallback_filter: DEFAULT_FILTER.to_owned(),
        }
    }

    pub fn with_fallback_filter(mut self, filter: impl Into<String>) -> Self {
        self.fallback_filter = filter.into();
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Install `env_logger` as the global logger.
///
/// Returns `false` if a logger was already installed, in which case the
/// existing one is left untouched.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let env = Env::default().default_filter_or(config.fallback_filter.as_str());
    let installed = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok();

    if installed {
        log::debug!("Logger installed, fallback filter '{}'", config.fallback_filter);
    }
    installed
}
