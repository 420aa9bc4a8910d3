//! Staged submission files
//!
//! Every evaluation gets its own directory under the configured working
//! directory. The submission and its auxiliary files are written there, the
//! interpreter runs there, and the whole directory is removed afterwards.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Errors that occur while staging or removing submission files
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create staging directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} into the staging directory: {source}")]
    Copy {
        from: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Check that `name` names an entry directly inside a directory: not empty,
/// not `.` or `..`, and free of path separators and NUL
pub fn is_plain_file_name(name: &str) -> bool {
    !(name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| c == '/' || c == '\\' || c == '\0'))
}

/// On-disk form of one submission
///
/// # Cleanup
///
/// Call [`teardown()`](Self::teardown) once the evaluation is over. If the
/// artifact is dropped without it (the evaluation future was cancelled, or a
/// panic unwound through it) the directory is removed synchronously in
/// `Drop` and a warning is logged.
#[derive(Debug)]
pub struct StagedArtifact {
    /// Unique ID, also the directory name suffix
    id: Uuid,

    /// Staging directory
    dir: PathBuf,

    /// Files written or copied into the directory
    files: Vec<PathBuf>,

    /// Whether the directory still exists
    active: bool,
}

impl StagedArtifact {
    /// Create a fresh staging directory under `root`
    #[instrument(skip_all, fields(root = %root.display()))]
    pub async fn create(root: &Path) -> Result<Self, StagingError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|source| StagingError::CreateDir {
                path: root.to_path_buf(),
                source,
            })?;

        let id = Uuid::new_v4();
        let dir = root.join(format!("eval-{id}"));

        // create_dir (not create_dir_all) so an existing directory is an error
        tokio::fs::create_dir(&dir)
            .await
            .map_err(|source| StagingError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        debug!(dir = %dir.display(), "created staging directory");

        Ok(Self {
            id,
            dir,
            files: Vec::new(),
            active: true,
        })
    }

    /// Get the artifact ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the staging directory
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Files staged so far, in the order they were added
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Check if the directory has not been torn down yet
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Get the path of a file inside the staging directory
    ///
    /// Returns an error if the name is not a plain file name.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, StagingError> {
        if !is_plain_file_name(name) {
            return Err(StagingError::InvalidPath(format!(
                "not a plain file name: {name}"
            )));
        }
        Ok(self.dir.join(name))
    }

    /// Write a file into the staging directory
    #[instrument(skip(self, content))]
    pub async fn write_file(&mut self, name: &str, content: &[u8]) -> Result<PathBuf, StagingError> {
        let path = self.file_path(name)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| StagingError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), len = content.len(), "wrote staged file");
        self.track(path.clone());
        Ok(path)
    }

    /// Copy auxiliary files into the staging directory, keeping their file
    /// names
    #[instrument(skip(self))]
    pub async fn copy_files(&mut self, paths: &[PathBuf]) -> Result<(), StagingError> {
        for from in paths {
            let name = from
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    StagingError::InvalidPath(format!("no file name in {}", from.display()))
                })?;
            let to = self.file_path(name)?;

            tokio::fs::copy(from, &to)
                .await
                .map_err(|source| StagingError::Copy {
                    from: from.clone(),
                    source,
                })?;

            debug!(from = %from.display(), to = %to.display(), "copied auxiliary file");
            self.track(to);
        }
        Ok(())
    }

    /// Remove the staged files and the staging directory
    ///
    /// Files the interpreter created in the directory are removed too.
    #[must_use = "teardown errors should be handled"]
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn teardown(mut self) -> Result<(), StagingError> {
        if !self.active {
            return Ok(());
        }

        for file in std::mem::take(&mut self.files) {
            match tokio::fs::remove_file(&file).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    warn!(path = %file.display(), error = %source, "failed to remove staged file");
                }
            }
        }

        // Mark inactive first: a failed removal must not be retried from Drop
        self.active = false;
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StagingError::Remove {
                    path: self.dir.clone(),
                    source,
                });
            }
        }

        debug!("staging directory removed");
        Ok(())
    }

    fn track(&mut self, path: PathBuf) {
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        if self.active {
            warn!(
                id = %self.id,
                dir = %self.dir.display(),
                "StagedArtifact dropped without teardown, removing synchronously"
            );

            if let Err(e) = std::fs::remove_dir_all(&self.dir)
                && e.kind() != ErrorKind::NotFound
            {
                warn!(dir = %self.dir.display(), error = %e, "best-effort removal failed");
            }
        }
    }
}
