//! # Logger
//!
//! Logging setup for the outclick crates.
//! The library itself only emits `tracing` events; this crate wires them to an
//! output, either as the process-wide subscriber or as a scoped [`Dispatch`]
//! that writes into any [`MakeWriter`] (for example a [`LogCapture`]).
//!
//! * Use [`LoggerBuilder::env_filter`] to set module-directed filters
//!   (e.g., `"outclick=debug"`), in addition to `RUST_LOG`.
//! * Use [`LoggerBuilder::json`] for machine-readable output.
//!
//! ## Example
//!
//! ```rust
//! # use outclick_logger::{LevelFilter, LogCapture, Logger};
//!
//! let capture = LogCapture::new();
//! let dispatch = Logger::builder()
//!     .name("my-app")
//!     .level(LevelFilter::WARN)
//!     .dispatch(capture.clone())
//!     .unwrap();
//!
//! tracing::dispatcher::with_default(&dispatch, || tracing::warn!("exclude selector ignored"));
//! assert!(capture.contains("exclude selector ignored"));
//! ```

mod capture;
mod error;

pub use crate::capture::{CaptureWriter, LogCapture};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::Dispatch;
pub use tracing::level_filters::LevelFilter;

use private::Sealed;
use tracing_subscriber::fmt::{MakeWriter, layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug)]
pub struct LoggerConfig {
    console: bool,
    level: LevelFilter,
    json: bool,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { console: true, level: LevelFilter::INFO, json: false, env_filter: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// A builder for configuring a tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    config: LoggerConfig,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Sets the name of the logger, reported once the subscriber is installed.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), config: self.config }
    }
}

impl<N: Sealed> LoggerBuilder<N> {
    /// Configures the minimum log level to be emitted.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `outclick=debug`).
    ///
    /// For [`LoggerBuilder::init`], `RUST_LOG` still applies when no filter is set.
    /// Invalid filters cause [`LoggerBuilder::init`] and [`LoggerBuilder::dispatch`]
    /// to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Enables console logging for [`LoggerBuilder::init`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Formats events as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }
}

impl LoggerBuilder<WithName> {
    /// Consumes the builder and installs the global tracing subscriber.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        validate_name(&self.name.0)?;
        if !self.config.console {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled. Enable console output or use dispatch()."
                    .into(),
                context: None,
            });
        }

        let env_filter = build_env_filter(&self.config, true)?;

        let console = if self.config.json {
            layer().json().boxed()
        } else {
            layer().compact().with_ansi(true).boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .try_init()
            .context(format!("Installing logger '{}'", self.name.0))?;

        tracing::debug!(logger = %self.name.0, "Logger initialized");
        Ok(Logger { name: self.name.0 })
    }

    /// Builds a subscriber that writes into `writer` without installing it globally.
    ///
    /// Use with [`tracing::dispatcher::with_default`] to scope it to a closure, or
    /// [`tracing::dispatcher::set_default`] to scope it to the current thread.
    /// `RUST_LOG` is ignored here so the output only depends on the builder.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn dispatch<W>(self, writer: W) -> Result<Dispatch, LoggerError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        validate_name(&self.name.0)?;
        let env_filter = build_env_filter(&self.config, false)?;

        let output = layer().with_writer(writer).with_ansi(false);
        let output = if self.config.json { output.json().boxed() } else { output.boxed() };

        Ok(Dispatch::new(tracing_subscriber::registry().with(env_filter).with(output)))
    }
}

/// A handle to the globally installed logging system.
#[must_use = "Keep the handle to document that logging was initialized."]
#[derive(Debug)]
pub struct Logger {
    name: String,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use outclick_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("my-app")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_name(name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    Ok(())
}

fn build_env_filter(config: &LoggerConfig, from_env: bool) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match config.env_filter.as_ref() {
        Some(filter) => builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid env filter '{filter}': {e}").into(),
            context: None,
        }),
        None if from_env => Ok(builder.from_env_lossy()),
        None => Ok(builder.parse_lossy("")),
    }
}
