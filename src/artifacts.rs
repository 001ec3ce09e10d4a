use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::error::PersistenceError;

/// Derive a filesystem-safe, collision-resistant folder name for one run
/// from the first URL in the batch.
///
/// The name combines the sanitized host with a timestamp so concurrent runs
/// against the same site land in separate folders. Malformed URLs degrade to
/// a generic stem rather than an error.
pub fn run_folder_name(seed_url: &str) -> String {
    let stem = Url::parse(seed_url)
        .ok()
        .and_then(|url| url.host_str().map(sanitize_component))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "scrape".to_string());

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}_{}_{:09}", stem, now.as_secs(), now.subsec_nanos())
}

/// Replace characters a host name could carry that are hostile in file
/// paths, and cap the component length.
pub fn sanitize_component(raw: &str) -> String {
    let mut name = raw.replace(['/', ':', '?', '&', '=', '#', '%', '\\'], "_");

    if name.len() > 100 {
        name.truncate(100);
    }
    name
}

/// Filename for the artifact at the given 1-based batch position.
///
/// The `artifact_<n>.md` numbering matches the URL's position in the
/// submitted batch and is a durable contract for downstream tooling, so it
/// holds even when earlier URLs failed.
pub fn artifact_filename(index: usize) -> String {
    format!("artifact_{}.md", index)
}

/// Writes normalized-text artifacts under one run's output folder.
///
/// The folder is exclusive to a single run; no two runs share one.
#[derive(Debug)]
pub struct ArtifactWriter {
    folder: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer rooted at `<output_root>/<run_name>`.
    ///
    /// The folder itself is created on first write, so an unwritable output
    /// root surfaces as per-artifact persistence failures instead of
    /// aborting the batch up front.
    pub fn new(output_root: &Path, run_name: &str) -> Self {
        Self {
            folder: output_root.join(run_name),
        }
    }

    /// The run folder artifacts are written under.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Persist `text` as `<folder>/<filename>` and return the full path.
    pub fn persist(&self, text: &str, filename: &str) -> Result<PathBuf, PersistenceError> {
        fs::create_dir_all(&self.folder).map_err(|source| PersistenceError::CreateFolder {
            path: self.folder.clone(),
            source,
        })?;

        let path = self.folder.join(filename);
        fs::write(&path, text).map_err(|source| PersistenceError::Write {
            path: path.clone(),
            source,
        })?;

        ::log::debug!("Persisted artifact: {}", path.display());
        Ok(path)
    }
}
