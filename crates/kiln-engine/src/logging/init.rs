use std::sync::Once;

use log::LevelFilter;

/// Modules of the backend layer, which logs one line per native call at
/// `trace` level.
const API_MODULE: &str = "kiln_engine::api";

/// Window-system crates that are chatty below `warn`.
const QUIET_CRATES: [&str; 3] = ["winit", "glutin", "glutin_winit"];

/// Logger configuration, carried by [`RuntimeConfig`](crate::window::RuntimeConfig).
///
/// `env_filter` follows the `env_logger` filter syntax (e.g.
/// "kiln_engine=debug,kiln_engine::api=trace") and replaces every other
/// setting, as does `RUST_LOG` when `env_filter` is unset.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// Level of the engine and the application.
    pub level: LevelFilter,
    /// Lets the backend's per-call `trace` lines through.
    pub trace_api_calls: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            trace_api_calls: false,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Filter directives for this config, given the value of `RUST_LOG`.
    pub fn directives(&self, rust_log: Option<&str>) -> String {
        if let Some(filter) = self.env_filter.as_deref().or(rust_log) {
            return filter.to_owned();
        }

        let api_level = if self.trace_api_calls {
            LevelFilter::Trace
        } else {
            self.level.min(LevelFilter::Debug)
        };
        let mut directives = vec![self.level.to_string().to_lowercase()];
        directives.push(format!("{API_MODULE}={}", api_level.to_string().to_lowercase()));
        for krate in QUIET_CRATES {
            directives.push(format!("{krate}={}", self.level.min(LevelFilter::Warn).to_string().to_lowercase()));
        }
        directives.join(",")
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once. [`Runtime::run`](crate::window::Runtime::run)
/// calls this with its config; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let directives = config.directives(rust_log.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&directives).write_style(config.write_style);
        if builder.try_init().is_err() {
            // A test harness or the host application already owns the logger.
            return;
        }

        log::debug!("logging initialized with `{directives}`");
    });
}
