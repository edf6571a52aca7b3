//! Structured logging configuration.

use tracing_subscriber::EnvFilter;

/// Default filter directive when neither `RUST_LOG` nor `RIVALGRAPH_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name, defaulting to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `rivalgraph=debug`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl LoggingConfig {
    /// Creates a logging configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Reads `RUST_LOG` (then `RIVALGRAPH_LOG`) and `RIVALGRAPH_LOG_FORMAT`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(filter) = std::env::var("RUST_LOG")
            .ok()
            .or_else(|| std::env::var("RIVALGRAPH_LOG").ok())
            .filter(|f| !f.trim().is_empty())
        {
            config.filter = filter;
        }

        if let Ok(format) = std::env::var("RIVALGRAPH_LOG_FORMAT") {
            config.format = LogFormat::parse(&format);
        }

        config
    }

    /// Builds the `EnvFilter`, falling back to [`DEFAULT_FILTER`] when the
    /// directive does not parse.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Pretty);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_format(LogFormat::Json)
            .with_filter("rivalgraph=debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "rivalgraph=debug");
    }
}
