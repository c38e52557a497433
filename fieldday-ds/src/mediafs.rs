//! Media file storage
//!
//! Uploaded photo/video bytes live under a root directory keyed by team id.
//! Filenames are sanitized before being joined to the root: any
//! path-separator or parent-directory component is rejected outright. The
//! media *metadata* row may be written before the corresponding file upload
//! completes; the two are not transactionally linked.

use fieldday_common::{Error, Result};
use std::path::{Path, PathBuf};

/// Filesystem store of uploaded media files, keyed by team.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> MediaStore {
        MediaStore { root: root.into() }
    }

    /// Store uploaded bytes for a team. Returns the stored path.
    pub fn save_file(&self, team_id: &str, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.resolve(team_id, filename)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        tracing::info!(team_id, filename, size = bytes.len(), "Stored media file");
        Ok(path)
    }

    /// Resolve the on-disk path for a team's file. Does not check existence.
    pub fn resolve(&self, team_id: &str, filename: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(sanitize_component(team_id)?)
            .join(sanitize_component(filename)?))
    }
}

/// Validate one path component: non-empty, no separators, no parent-directory
/// traversal.
pub fn sanitize_component(component: &str) -> Result<&Path> {
    if component.is_empty()
        || component.contains('/')
        || component.contains('\\')
        || component.contains("..")
        || component == "."
    {
        return Err(Error::InvalidInput(format!(
            "unsafe filename: {:?}",
            component
        )));
    }
    Ok(Path::new(component))
}
