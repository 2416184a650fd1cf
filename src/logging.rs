//! Logger initialization.
//!
//! Library code only talks to the `log` facade. Hosts that want output call
//! [`init_logging`] early, before initializing a [`RenderSession`](crate::RenderSession).

use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax, e.g.
/// `"surface_cube=debug,wgpu_core=warn"`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// Filter precedence: `config.env_filter`, then `RUST_LOG`, then `info` for this
/// crate with wgpu internals held at `warn`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder
                .filter_level(log::LevelFilter::Info)
                .filter_module("wgpu_core", log::LevelFilter::Warn)
                .filter_module("wgpu_hal", log::LevelFilter::Warn)
                .filter_module("naga", log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);

        // try_init: the host may already own a logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
