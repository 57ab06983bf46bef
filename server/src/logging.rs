use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber, bridging `log` records.
///
/// `RUST_LOG` controls the filter; defaults to `info`.
pub fn init(service: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    log::info!("starting {service}");
}
