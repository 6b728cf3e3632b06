//! Telemetry helpers for applications embedding `track-chart`.
//!
//! Tracing setup stays explicit and opt-in: call `init_default_tracing` or
//! wire your own `tracing` subscriber and filters.

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "track_chart=info";

/// Initializes a compact `tracing` subscriber when the `telemetry` feature is enabled.
///
/// Returns `false` when the feature is disabled or the host application
/// already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_FILTER;

    #[test]
    fn default_filter_targets_this_crate() {
        assert!(DEFAULT_FILTER.starts_with("track_chart"));
    }
}
