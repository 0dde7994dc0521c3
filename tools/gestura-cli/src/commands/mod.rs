use std::path::{Path, PathBuf};

use gestura_common::config::AppConfig;

pub mod check;
pub mod config;
pub mod prepare;
pub mod run;

/// Bare recording names that do not exist locally are looked up in the recordings directory.
pub(crate) fn resolve_recording(app: &AppConfig, path: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path.to_path_buf();
    }
    let candidate = app.recordings_dir.join(path);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "Using recording from recordings dir");
        candidate
    } else {
        path.to_path_buf()
    }
}
