use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber on stderr.
///
/// `RUST_LOG` wins when set. Otherwise `-q`/`-v` pick the level, then the
/// configured level, then `info`.
pub fn init(verbose: u8, quiet: bool, configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet, configured)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_directive(verbose: u8, quiet: bool, configured: Option<&str>) -> String {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => configured.unwrap_or("info"),
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    level.to_string()
}
