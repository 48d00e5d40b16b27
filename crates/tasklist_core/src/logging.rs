use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV_VAR: &str = "RUST_LOG";

/// Installs a stderr subscriber. Tracing is opt-in through `RUST_LOG` so
/// stdout stays clean for `--json` consumers; an invalid filter means off.
///
/// Calling this more than once is harmless.
pub fn init_logging() {
    let filter = filter_from(std::env::var(LOG_ENV_VAR).ok().as_deref());

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty() && raw.len() <= 4096)
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("off"))
}

#[cfg(test)]
mod tests {
    use super::{filter_from, init_logging};

    #[test]
    fn blank_filter_turns_logging_off() {
        assert_eq!(filter_from(None).to_string(), "off");
        assert_eq!(filter_from(Some("   ")).to_string(), "off");
    }

    #[test]
    fn valid_filter_is_kept() {
        let filter = filter_from(Some("tasklist_core=debug")).to_string();
        assert!(filter.contains("tasklist_core"));
        assert!(filter.contains("debug"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logging();
        init_logging();
    }
}
