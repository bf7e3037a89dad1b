//! Observability (logging)
//!
//! Installs a `tracing` subscriber writing to stderr so that command output on
//! stdout stays clean. `RUST_LOG` wins when set; otherwise the level follows
//! the CLI verbosity flags.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Logging configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Number of `-v` flags
    pub verbosity: u8,

    /// `-q`: errors only
    pub quiet: bool,

    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl ObservabilityConfig {
    /// Filter directive for the configured verbosity
    #[must_use]
    pub const fn directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Initialize logging
///
/// # Example
///
/// ```rust,no_run
/// use rulestack::observability::{self, ObservabilityConfig};
///
/// # fn main() -> rulestack::Result<()> {
/// observability::init(ObservabilityConfig { verbosity: 1, ..Default::default() })?;
/// tracing::info!("started");
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`Error::Config`] if a global subscriber is already installed.
pub fn init(config: ObservabilityConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.map_err(|err| Error::Config(format!("cannot install logger: {err}")))
}
