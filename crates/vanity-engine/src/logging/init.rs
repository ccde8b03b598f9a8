use std::io::Write;
use std::sync::Once;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "VANITY_PLOT_LOG";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "vanity_plot=debug,wgpu=warn").
///
/// `label` is printed in front of every line so the producer and the viewer
/// process can be told apart when they share a terminal.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub label: &'static str,
    pub write_style: env_logger::WriteStyle,
}

impl LoggingConfig {
    pub fn labeled(label: &'static str) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.env_filter = filter;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            label: "vanity",
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Output always goes to stderr: the viewer's
/// stdin is the command channel and stdout stays unused.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config
            .env_filter
            .or_else(|| std::env::var(LOG_ENV).ok())
            .or_else(|| std::env::var("RUST_LOG").ok());

        match filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
            }
        }

        let label = config.label;
        builder
            .target(env_logger::Target::Stderr)
            .write_style(config.write_style)
            .format(move |buf, record| {
                writeln!(
                    buf,
                    "[{label} {} {}] {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            });

        // A host application may already own the global logger.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized for {label}");
    });
}
