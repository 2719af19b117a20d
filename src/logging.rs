use tracing_subscriber::EnvFilter;

/// Initialise logging. With `debug` set the level defaults to `debug` and can
/// be overridden through `RUST_LOG`; otherwise it is pinned to `info`.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
