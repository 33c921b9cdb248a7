use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive derived from config; `RUST_LOG` takes precedence.
fn build_filter(cfg: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = cfg.filter.as_deref().unwrap_or(&cfg.level);
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directive}' ({e}), falling back to 'info'");
        EnvFilter::new("info")
    })
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(cfg: &LoggingConfig) {
    let filter = build_filter(cfg);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match cfg.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
    };

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn filter_prefers_explicit_directive() {
        let cfg = LoggingConfig {
            level: "warn".to_owned(),
            filter: Some("parity=debug".to_owned()),
            ..LoggingConfig::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(build_filter(&cfg).to_string(), "parity=debug");
        }
    }

    #[test]
    fn bad_directive_falls_back() {
        let cfg = LoggingConfig {
            level: "parity=loud".to_owned(),
            ..LoggingConfig::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(build_filter(&cfg).to_string(), "info");
        }
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(&LoggingConfig::default());
        init_logging(&LoggingConfig::default());
    }
}
