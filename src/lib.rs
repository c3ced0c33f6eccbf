pub mod core;
pub mod utils;

/// Installs a stderr subscriber so stdout only carries what a target prints.
/// Filter with `RUST_LOG`, defaults to `warn`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
