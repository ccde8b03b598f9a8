use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{SessionError, VIEWER_BIN, VIEWER_ENV};

/// How a session finds and manages its viewer process.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Viewer executable. Falls back to `VANITY_PLOT_VIEWER`, then to a
    /// `vanity-plot-viewer` next to the running executable.
    pub viewer: Option<PathBuf>,

    /// Window title.
    pub title: String,

    /// Log filter handed to the viewer (`--log`). `None` lets the viewer
    /// read its own environment.
    pub log_filter: Option<String>,

    /// How long `close` waits for the viewer before killing it.
    pub shutdown_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewer: None,
            title: "vanity plot".to_string(),
            log_filter: None,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl SessionConfig {
    pub fn resolve_viewer(&self) -> Result<PathBuf, SessionError> {
        if let Some(path) = &self.viewer {
            return Ok(path.clone());
        }
        if let Some(path) = env::var_os(VIEWER_ENV) {
            return Ok(PathBuf::from(path));
        }

        let exe = env::current_exe().map_err(|_| SessionError::ViewerNotFound)?;
        viewer_candidates(&exe)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or(SessionError::ViewerNotFound)
    }
}

/// Places a viewer binary may live relative to `exe`: its own directory,
/// then the parent (integration tests run from `target/<profile>/deps`).
pub(crate) fn viewer_candidates(exe: &Path) -> Vec<PathBuf> {
    let file = format!("{VIEWER_BIN}{}", env::consts::EXE_SUFFIX);
    exe.parent()
        .into_iter()
        .flat_map(|dir| [Some(dir), dir.parent()])
        .flatten()
        .map(|dir| dir.join(&file))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_viewer_wins() {
        let config = SessionConfig {
            viewer: Some(PathBuf::from("/opt/plot/viewer")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_viewer().unwrap(),
            PathBuf::from("/opt/plot/viewer")
        );
    }

    #[test]
    fn candidates_cover_sibling_and_parent() {
        let exe = Path::new("/work/target/debug/deps/session-1234");
        let suffix = env::consts::EXE_SUFFIX;
        assert_eq!(
            viewer_candidates(exe),
            vec![
                PathBuf::from(format!("/work/target/debug/deps/vanity-plot-viewer{suffix}")),
                PathBuf::from(format!("/work/target/debug/vanity-plot-viewer{suffix}")),
            ]
        );
    }
}
