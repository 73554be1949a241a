use log::LevelFilter;

/// Installs the global logger.
///
/// `RUST_LOG` is honored for per-module filters; `level` sets the default.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_millis()
        .init();
}
