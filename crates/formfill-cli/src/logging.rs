//! Log subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise the filter follows `-q`/`-v`. Logs go
//! to stderr so prompts and results on stdout stay clean.

use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

/// Filter for `config`, honoring `RUST_LOG`
#[must_use]
pub fn filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.default_filter()))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_writer(std::io::stderr)
        .with_ansi(config.color.should_color());
    let _ = if config.log_json {
        builder.json().try_init()
    } else {
        builder.with_target(config.verbosity.is_verbose()).try_init()
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
        init(&config);
        init(&config.with_log_json(true));
    }

    #[test]
    fn test_filter_builds_for_every_level() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Debug,
        ] {
            let rendered = filter(&CliConfig::new().with_verbosity(verbosity)).to_string();
            assert!(!rendered.is_empty());
        }
    }
}
