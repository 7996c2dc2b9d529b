//! Durable storage for the recorded action log.
//!
//! Every store rewrites the whole log through a temp-file-and-rename, so a
//! failed write never clobbers what was already on disk.

use crate::config::RecordingConfig;
use crate::errors::RewindError;
use crate::replay::recording::{parse_log, render_log, RecordedAction};
use crate::runtime::{Clock, FileSystem, ProductionRuntime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

pub const DEFAULT_RECORDING_FILE: &str = "recording.json";

#[derive(Clone)]
pub struct RecordingLog {
    file_system: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    directory: PathBuf,
    file_name: String,
    pretty: bool,
}

impl RecordingLog {
    pub fn new(
        file_system: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            file_system,
            clock,
            directory: directory.into(),
            file_name: DEFAULT_RECORDING_FILE.to_string(),
            pretty: true,
        }
    }

    pub fn from_config(runtime: &ProductionRuntime, config: &RecordingConfig) -> Self {
        Self {
            file_system: Arc::clone(&runtime.file_system),
            clock: Arc::clone(&runtime.clock),
            directory: config.directory.clone(),
            file_name: config.file_name.clone(),
            pretty: config.pretty,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// File rewritten on every recorded action.
    pub fn recording_path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// File read when loading the recording named `recording`.
    pub fn load_path(&self, recording: &str) -> PathBuf {
        self.directory.join(recording)
    }

    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }

    /// Replace the on-disk log with `entries`.
    pub fn store(&self, entries: &[RecordedAction]) -> Result<(), RewindError> {
        let text = render_log(entries, self.pretty)?;
        let path = self.recording_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.file_system.create_dir_all(parent)?;
        }
        self.file_system.write_atomic(&path, &text)
    }

    /// Entries of the recording named `recording`, in file order.
    ///
    /// A missing or unreadable file is an empty recording.
    pub fn load(&self, recording: &str) -> Vec<RecordedAction> {
        self.load_from(&self.load_path(recording))
    }

    pub fn load_from(&self, path: &Path) -> Vec<RecordedAction> {
        match self.file_system.read_to_string(path) {
            Ok(text) => parse_log(&text),
            Err(error) => {
                tracing::debug!(path = %path.display(), error = %error, "no readable recording");
                Vec::new()
            }
        }
    }
}
