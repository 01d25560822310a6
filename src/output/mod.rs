use std::fmt;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::render::save_certificate;
use crate::CertsendError;

/// Identifies one invocation: `<YYYY-MM-DD_HH-MM-SS>_<uuid>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunId(String);

impl RunId {
    pub fn generate() -> Self {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        Self(format!("{stamp}_{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened when the run directory was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    Removed,
    NotFound,
    Failed(String),
}

/// The per-run output directory. Nothing is created until the first save.
#[derive(Debug, Clone)]
pub struct RunOutput {
    dir: PathBuf,
}

impl RunOutput {
    pub fn new(root: &Path, run_id: &RunId) -> Self {
        Self {
            dir: root.join(run_id.as_str()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where attendee `index` (1-based) is written.
    pub fn path_for(&self, index: usize, extension: &str) -> PathBuf {
        self.dir.join(format!("{index}.{extension}"))
    }

    pub fn save(
        &self,
        index: usize,
        extension: &str,
        format: ImageFormat,
        image: &RgbaImage,
    ) -> crate::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CertsendError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(index, extension);
        save_certificate(image, &path, format)?;
        Ok(path)
    }

    /// Remove the whole run directory. Failures are logged, never returned.
    pub fn clear(&self) -> ClearOutcome {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                tracing::info!(path = %self.dir.display(), "run output cleared");
                ClearOutcome::Removed
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.dir.display(), "run output directory not found");
                ClearOutcome::NotFound
            }
            Err(e) => {
                tracing::error!(
                    path = %self.dir.display(),
                    error = %e,
                    "failed to clear run output"
                );
                ClearOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_shape() {
        let id = RunId::generate();
        let (stamp, suffix) = id.as_str().split_at(19);
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d_%H-%M-%S").is_ok());
        let suffix = suffix.strip_prefix('_').unwrap();
        assert!(uuid::Uuid::parse_str(suffix).is_ok());
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::generate(), RunId::generate());
    }

    #[test]
    fn test_directory_created_lazily() {
        let root = tempfile::tempdir().unwrap();
        let output = RunOutput::new(&root.path().join("nested").join("output"), &"run".into());
        assert!(!output.dir().exists());

        let path = output
            .save(1, "png", ImageFormat::Png, &RgbaImage::new(2, 2))
            .unwrap();
        assert_eq!(path, output.dir().join("1.png"));
        assert!(path.is_file());

        // second save into the existing directory is fine
        output
            .save(2, "png", ImageFormat::Png, &RgbaImage::new(2, 2))
            .unwrap();
        assert!(output.dir().join("2.png").is_file());
    }

    #[test]
    fn test_clear_removes_tree() {
        let root = tempfile::tempdir().unwrap();
        let output = RunOutput::new(root.path(), &"run".into());
        output
            .save(1, "png", ImageFormat::Png, &RgbaImage::new(2, 2))
            .unwrap();
        assert_eq!(output.clear(), ClearOutcome::Removed);
        assert!(!output.dir().exists());
    }

    #[test]
    fn test_clear_missing_is_benign() {
        let root = tempfile::tempdir().unwrap();
        let output = RunOutput::new(root.path(), &"never-written".into());
        assert_eq!(output.clear(), ClearOutcome::NotFound);
    }

    #[test]
    fn test_clear_failure_is_reported_not_raised() {
        let root = tempfile::tempdir().unwrap();
        let output = RunOutput::new(root.path(), &"run".into());
        // a regular file where the run directory should be
        std::fs::write(output.dir(), b"not a directory").unwrap();

        assert!(matches!(output.clear(), ClearOutcome::Failed(_)));
        assert!(output.dir().is_file());
    }
}
