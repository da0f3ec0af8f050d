//! Logging initialization for the Vellum client.
//!
//! Thin configuration layer over `tracing-subscriber`, guarded so repeated
//! initialization (e.g. from tests) is harmless.

use std::sync::Once;

use tracing::Level;

/// Static initialization guard
static INIT: Once = Once::new();

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level
    pub default_level: Level,
    /// Component-specific log levels
    pub component_levels: Vec<(String, Level)>,
    /// Whether to include target/module
    pub include_target: bool,
    /// Whether to use ANSI colors
    pub use_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            component_levels: vec![
                ("vellum_client::bootstrap".to_string(), Level::DEBUG),
                ("vellum_core::events".to_string(), Level::DEBUG),
            ],
            include_target: true,
            use_ansi: true,
        }
    }
}

/// Initialize the logging system. Subsequent calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter_string(&config);
        tracing_subscriber::fmt()
            .with_target(config.include_target)
            .with_ansi(config.use_ansi)
            .with_env_filter(filter)
            .init();
    });
}

/// Build an env-filter string from configuration.
pub fn build_filter_string(config: &LoggingConfig) -> String {
    let mut filter = format!("vellum_client={},vellum_core={}", config.default_level, config.default_level);
    for (component, level) in &config.component_levels {
        filter.push_str(&format!(",{}={}", component, level));
    }
    filter
}
