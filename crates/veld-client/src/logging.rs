//! Logging bootstrap for applications using the client.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the application's decision, typically once at startup:
//!
//! ```rust,ignore
//! use veld_client::logging::LoggingBuilder;
//!
//! LoggingBuilder::new().directive("veld_core=debug").init();
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Builder for a console `tracing` subscriber with env-filter support.
///
/// The `RUST_LOG` environment variable takes precedence over the coded
/// level and directives when set.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: Level,
    directives: Vec<String>,
    with_target: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            directives: Vec::new(),
            with_target: true,
        }
    }
}

impl LoggingBuilder {
    /// Creates a builder with INFO default level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a filter directive (e.g. `"veld_transport=trace"`).
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Controls whether the emitting module target is printed.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));
        for directive in &self.directives {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
        filter
    }

    /// Installs the subscriber, replacing nothing if one is already set.
    pub fn try_init(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter = self.filter();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.with_target)
            .try_init()
    }

    /// Installs the subscriber, ignoring an already-installed one.
    pub fn init(self) {
        let _ = self.try_init();
    }
}
