//! JSON persistence for trained model artifacts.
//!
//! Trained models land under two output directories, one per model kind:
//! `<out>/classifier/model.json` and `<out>/transition/model.json`.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Directory name for persisted classifier artifacts.
pub const CLASSIFIER_DIR: &str = "classifier";

/// Directory name for persisted transition-model artifacts.
pub const TRANSITION_DIR: &str = "transition";

/// File name of a persisted model.
pub const MODEL_FILE: &str = "model.json";

/// Error raised while persisting or loading a model artifact.
#[derive(Debug)]
pub struct ArtifactError {
    /// Path involved in the failed operation.
    pub path: String,
    /// Human-readable problem description.
    pub message: String,
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact error: {} — {}", self.path, self.message)
    }
}

impl std::error::Error for ArtifactError {}

/// Path of the classifier artifact under `out_dir`.
pub fn classifier_path(out_dir: &Path) -> PathBuf {
    out_dir.join(CLASSIFIER_DIR).join(MODEL_FILE)
}

/// Path of the transition-model artifact under `out_dir`.
pub fn transition_path(out_dir: &Path) -> PathBuf {
    out_dir.join(TRANSITION_DIR).join(MODEL_FILE)
}

/// Serializes `value` as pretty JSON at `path`, creating parent directories.
///
/// # Errors
///
/// Returns an [`ArtifactError`] on I/O or serialization failure.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArtifactError {
            path: parent.display().to_string(),
            message: format!("cannot create directory: {e}"),
        })?;
    }
    let file = File::create(path).map_err(|e| ArtifactError {
        path: path.display().to_string(),
        message: format!("cannot create: {e}"),
    })?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| ArtifactError {
        path: path.display().to_string(),
        message: format!("serialization failed: {e}"),
    })
}

/// Deserializes a value from the JSON file at `path`.
///
/// # Errors
///
/// Returns an [`ArtifactError`] if the file is missing or malformed.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|e| ArtifactError {
        path: path.display().to_string(),
        message: format!("cannot open: {e}"),
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|e| ArtifactError {
        path: path.display().to_string(),
        message: format!("deserialization failed: {e}"),
    })
}
