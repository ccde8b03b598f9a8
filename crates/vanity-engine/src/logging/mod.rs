//! Logging utilities.
//!
//! Both processes of a plot (producer and viewer) log through the `log`
//! facade; this module only decides how `env_logger` is wired up.

mod init;

pub use init::{init_logging, LoggingConfig, LOG_ENV};
