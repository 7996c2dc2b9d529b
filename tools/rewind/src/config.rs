use crate::errors::RewindError;
use crate::replay::recorder::DEFAULT_RECORDING_FILE;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub recording: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub recording: RecordingConfig,
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordingConfig {
    pub directory: PathBuf,
    pub file_name: String,
    pub pretty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReplayConfig {
    pub recording: Option<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            file_name: DEFAULT_RECORDING_FILE.to_string(),
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialAppConfig {
    recording: Option<PartialRecordingConfig>,
    replay: Option<PartialReplayConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialRecordingConfig {
    directory: Option<PathBuf>,
    file_name: Option<String>,
    pretty: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialReplayConfig {
    recording: Option<String>,
}

/// Defaults, then the config file, then CLI overrides. Relative directories
/// resolve against `process_cwd`.
pub fn load_config(
    overrides: &CliOverrides,
    process_cwd: &Path,
    fs: &dyn FileSystem,
) -> Result<AppConfig, RewindError> {
    let mut cfg = AppConfig::default();

    if let Some(path) = &overrides.config_path {
        let file_contents = fs.read_to_string(path)?;
        let partial: PartialAppConfig = toml::from_str(&file_contents)
            .map_err(|e| RewindError::ConfigParse(e.to_string()))?;
        merge_partial_config(&mut cfg, partial);
    }

    apply_cli_overrides(&mut cfg, overrides);
    cfg.recording.directory = absolutize_path(process_cwd, &cfg.recording.directory);

    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut AppConfig, partial: PartialAppConfig) {
    if let Some(recording) = partial.recording {
        if let Some(directory) = recording.directory {
            cfg.recording.directory = directory;
        }
        if let Some(file_name) = recording.file_name {
            cfg.recording.file_name = file_name;
        }
        if let Some(pretty) = recording.pretty {
            cfg.recording.pretty = pretty;
        }
    }

    if let Some(replay) = partial.replay {
        if let Some(recording) = replay.recording {
            cfg.replay.recording = Some(recording);
        }
    }
}

fn apply_cli_overrides(cfg: &mut AppConfig, overrides: &CliOverrides) {
    if let Some(directory) = &overrides.directory {
        cfg.recording.directory = directory.clone();
    }
    if let Some(recording) = &overrides.recording {
        cfg.replay.recording = Some(recording.clone());
    }
}

fn absolutize_path(base: &Path, value: &Path) -> PathBuf {
    let joined = if value.is_absolute() {
        value.to_path_buf()
    } else {
        base.join(value)
    };
    // `components()` drops interior `.` segments.
    joined.components().collect()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn validate_config(cfg: &AppConfig) -> Result<(), RewindError> {
    if !is_plain_file_name(&cfg.recording.file_name) {
        return Err(RewindError::InvalidConfig(
            "recording.file_name must be a plain file name".to_string(),
        ));
    }

    if let Some(recording) = &cfg.replay.recording {
        if !is_plain_file_name(recording) {
            return Err(RewindError::InvalidConfig(
                "replay.recording must be a plain file name".to_string(),
            ));
        }
    }

    Ok(())
}
