//! Log setup for the `deploytrail` binary.
//!
//! Dashboard frames own stdout, so every log line goes to stderr. Without
//! `RUST_LOG` only the deploytrail crates log at the requested level; HTTP
//! stack chatter (reqwest, hyper, rustls) is held at `warn` so a `watch`
//! session stays readable.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEPLOYTRAIL_TARGETS: &[&str] = &["deploytrail", "deploytrail_core", "deploytrail_store"];

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(level: Level) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        DEPLOYTRAIL_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Install the global subscriber. A second call leaves the first in place.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let text = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let json = json.then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text)
        .with(json)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_level_to_deploytrail() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("deploytrail_core=DEBUG"));
        assert!(directives.contains("deploytrail_store=DEBUG"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
