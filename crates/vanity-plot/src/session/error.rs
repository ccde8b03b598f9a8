use std::ffi::OsString;
use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(
        "could not locate the `vanity-plot-viewer` executable; \
         set VANITY_PLOT_VIEWER or SessionConfig::viewer"
    )]
    ViewerNotFound,

    #[error("failed to spawn viewer {program:?}")]
    Spawn {
        program: OsString,
        #[source]
        source: io::Error,
    },

    #[error("viewer was spawned without a stdin pipe")]
    NoChannel,
}
