//! Subscriber setup for watching N-way PLS fits
//!
//! The engine emits events whether or not a subscriber is installed:
//!
//! - `info` when X or Y holds missing values
//! - `debug` once per extracted component, with the inner loop iteration
//!   count, residual sums of squares and percent explained
//! - `warn` when the inner loop hits its iteration cap, or when regression
//!   coefficients are skipped for a multiway response
//!
//! Every fit runs inside a `fit_with_rng` span carrying the X and Y shapes
//! and the component count.
//!
//! # Example
//!
//! ```ignore
//! use npls::tracing_support::{init_tracing, TracingConfig};
//!
//! // one line per component
//! init_tracing(&TracingConfig::from_env()?.with_fit_progress())?;
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directive (default `npls=info`)
//! - `NPLS_LOG_FORMAT`: `compact`, `pretty` or `json` (default `compact`)

use anyhow::{bail, Result};
use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Directive that turns on the per-component `debug` events
const FIT_PROGRESS: &str = "npls::engine=debug";

/// Output layout of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per event
    #[default]
    Compact,
    /// Multi-line, with span context
    Pretty,
    /// JSON lines including the current fit span
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format {:?}, expected compact, pretty or json", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, e.g. `npls=info`
    pub filter: String,
    /// ANSI colors; ignored for JSON
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Compact,
            filter: "npls=info".to_string(),
            ansi: true,
        }
    }
}

impl TracingConfig {
    /// Read `NPLS_LOG_FORMAT` and `RUST_LOG`, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Fails on an unknown `NPLS_LOG_FORMAT` value.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(format) = std::env::var("NPLS_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            config.filter = filter;
        }
        Ok(config)
    }

    /// Also show the per-component progress of every fit.
    pub fn with_fit_progress(mut self) -> Self {
        if !self.filter.split(',').any(|d| d.trim() == FIT_PROGRESS) {
            if !self.filter.is_empty() {
                self.filter.push(',');
            }
            self.filter.push_str(FIT_PROGRESS);
        }
        self
    }
}

/// Install the global subscriber. Call once at startup.
///
/// # Errors
///
/// Fails on an invalid filter directive or when a global subscriber is
/// already set.
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)?;

    let layer = match config.format {
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_ansi(config.ansi)
            .with_target(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_ansi(config.ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("verbose".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_fit_progress_directive_is_added_once() {
        let config = TracingConfig::default().with_fit_progress();
        assert_eq!(config.filter, "npls=info,npls::engine=debug");
        assert_eq!(config.clone().with_fit_progress(), config);

        let empty = TracingConfig {
            filter: String::new(),
            ..TracingConfig::default()
        };
        assert_eq!(empty.with_fit_progress().filter, FIT_PROGRESS);
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        let config = TracingConfig {
            filter: "npls=notalevel[".to_string(),
            ..TracingConfig::default()
        };
        assert!(init_tracing(&config).is_err());
    }
}
