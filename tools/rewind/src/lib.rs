pub mod action;
pub mod config;
pub mod errors;
pub mod logging;
pub mod registry;
pub mod replay;
pub mod runtime;
pub mod store;

use clap::{error::ErrorKind, Parser, Subcommand};
use config::{load_config, AppConfig, CliOverrides};
use errors::RewindError;
use replay::recorder::RecordingLog;
use replay::recording::RecordedAction;
use runtime::ProductionRuntime;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use action::{Action, StandardAction, StandardActionConvertible};
pub use registry::{TypeMap, TypeRegistry};
pub use replay::replayer::RecordingStore;

#[derive(Debug, Clone, Parser)]
#[command(name = "rewind")]
#[command(about = "Inspect recorded action logs")]
pub struct Cli {
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,
    #[arg(long, global = true)]
    pub recording: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// One line per recorded action.
    List,
    /// Canonical JSON of the action at a 1-based step.
    Show { step: usize },
    /// Entry count and per-type counts.
    Summary,
}

pub fn run() -> Result<i32, RewindError> {
    let args = std::env::args_os().collect::<Vec<_>>();
    let cwd = std::env::current_dir().map_err(|e| RewindError::Io(e.to_string()))?;
    let runtime = ProductionRuntime::new();
    run_with_runtime(&args, &cwd, &runtime)
}

pub fn run_with_runtime(
    args: &[std::ffi::OsString],
    cwd: &std::path::Path,
    runtime: &ProductionRuntime,
) -> Result<i32, RewindError> {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{error}");
                return Ok(0);
            }
            _ => return Err(RewindError::Cli(error.to_string())),
        },
    };

    let overrides = CliOverrides {
        config_path: cli.config.clone(),
        directory: cli.directory.clone(),
        recording: cli.recording.clone(),
    };
    let cfg = load_config(&overrides, cwd, runtime.file_system.as_ref())?;

    let log = RecordingLog::from_config(runtime, &cfg.recording);
    let recording = recording_name(&cfg);
    let entries = log.load(&recording);
    tracing::debug!(
        path = %log.load_path(&recording).display(),
        entries = entries.len(),
        "loaded recording"
    );

    let lines = match cli.command {
        Command::List => list_lines(&entries),
        Command::Show { step } => show_lines(&entries, step)?,
        Command::Summary => summary_lines(&log, &recording, &entries),
    };
    for line in lines {
        runtime.terminal.write_line(&line)?;
    }
    Ok(0)
}

/// The recording to inspect: `replay.recording`, else the live file.
pub fn recording_name(cfg: &AppConfig) -> String {
    cfg.replay
        .recording
        .clone()
        .unwrap_or_else(|| cfg.recording.file_name.clone())
}

fn list_lines(entries: &[RecordedAction]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{step:>4}  {timestamp:>16.3}  {tag}{typed}",
                step = index + 1,
                timestamp = entry.timestamp,
                tag = entry.action.action_type,
                typed = if entry.action.is_typed_action {
                    " (typed)"
                } else {
                    ""
                },
            )
        })
        .collect()
}

fn show_lines(entries: &[RecordedAction], step: usize) -> Result<Vec<String>, RewindError> {
    let entry = step
        .checked_sub(1)
        .and_then(|index| entries.get(index))
        .ok_or(RewindError::StepOutOfRange {
            step,
            available: entries.len(),
        })?;
    let rendered = serde_json::to_string_pretty(&entry.action.dictionary_representation()?)
        .map_err(|e| RewindError::Serialization(e.to_string()))?;
    Ok(rendered.lines().map(str::to_string).collect())
}

fn summary_lines(log: &RecordingLog, recording: &str, entries: &[RecordedAction]) -> Vec<String> {
    let mut counts = BTreeMap::<&str, usize>::new();
    for entry in entries {
        *counts.entry(entry.action.action_type.as_str()).or_default() += 1;
    }

    let mut lines = vec![
        format!("recording: {}", log.load_path(recording).display()),
        format!("entries: {}", entries.len()),
    ];
    lines.extend(
        counts
            .into_iter()
            .map(|(tag, count)| format!("  {tag}: {count}")),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{FakeClock, FakeFileSystem, FakeTerminal};
    use serde_json::json;
    use std::ffi::OsString;
    use std::path::Path;
    use std::sync::Arc;

    fn sample_log() -> String {
        json!([
            {"timestamp": 1.0, "action": {"type": "INCREMENT", "payload": "ReSwift_Null", "isTypedAction": false}},
            {"timestamp": 2.5, "action": {"type": "SetName", "payload": {"name": "ada"}, "isTypedAction": true}},
            {"timestamp": 3.0, "action": {"type": "INCREMENT", "payload": "ReSwift_Null", "isTypedAction": false}}
        ])
        .to_string()
    }

    fn runtime_with(fs: FakeFileSystem, terminal: &FakeTerminal) -> ProductionRuntime {
        ProductionRuntime {
            clock: Arc::new(FakeClock::default()),
            file_system: Arc::new(fs),
            terminal: Arc::new(terminal.clone()),
        }
    }

    fn run_args(runtime: &ProductionRuntime, args: &[&str]) -> Result<i32, RewindError> {
        let args = std::iter::once("rewind")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect::<Vec<_>>();
        run_with_runtime(&args, Path::new("/work"), runtime)
    }

    #[test]
    fn list_prints_one_line_per_entry() {
        let terminal = FakeTerminal::default();
        let runtime = runtime_with(
            FakeFileSystem::with_file("/work/recording.json", sample_log()),
            &terminal,
        );
        assert_eq!(run_args(&runtime, &["list"]).expect("list"), 0);

        let lines = terminal.written_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("1 "));
        assert!(lines[1].ends_with("SetName (typed)"));
        assert!(lines[2].ends_with("INCREMENT"));
    }

    #[test]
    fn show_renders_canonical_action_json() {
        let terminal = FakeTerminal::default();
        let runtime = runtime_with(
            FakeFileSystem::with_file("/data/session.json", sample_log()),
            &terminal,
        );
        run_args(
            &runtime,
            &["--directory", "/data", "--recording", "session.json", "show", "2"],
        )
        .expect("show");

        let text = terminal.written_lines().join("\n");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(
            value,
            json!({"type": "SetName", "payload": {"name": "ada"}, "isTypedAction": true})
        );
    }

    #[test]
    fn show_rejects_steps_outside_recording() {
        let terminal = FakeTerminal::default();
        let runtime = runtime_with(
            FakeFileSystem::with_file("/work/recording.json", sample_log()),
            &terminal,
        );
        let err = run_args(&runtime, &["show", "0"]).expect_err("zero");
        assert!(matches!(err, RewindError::StepOutOfRange { step: 0, available: 3 }));
        let err = run_args(&runtime, &["show", "4"]).expect_err("past end");
        assert!(matches!(err, RewindError::StepOutOfRange { step: 4, available: 3 }));
    }

    #[test]
    fn summary_counts_types_and_tolerates_missing_file() {
        let terminal = FakeTerminal::default();
        let runtime = runtime_with(
            FakeFileSystem::with_file("/work/recording.json", sample_log()),
            &terminal,
        );
        run_args(&runtime, &["summary"]).expect("summary");
        assert_eq!(
            terminal.written_lines(),
            vec![
                "recording: /work/recording.json".to_string(),
                "entries: 3".to_string(),
                "  INCREMENT: 2".to_string(),
                "  SetName: 1".to_string(),
            ]
        );

        let empty_terminal = FakeTerminal::default();
        let empty = runtime_with(FakeFileSystem::default(), &empty_terminal);
        run_args(&empty, &["--recording", "missing.json", "summary"]).expect("summary");
        assert_eq!(empty_terminal.written_lines()[1], "entries: 0");
    }

    #[test]
    fn unknown_arguments_are_cli_errors() {
        let terminal = FakeTerminal::default();
        let runtime = runtime_with(FakeFileSystem::default(), &terminal);
        let err = run_args(&runtime, &["--bogus"]).expect_err("bad flag");
        assert!(matches!(err, RewindError::Cli(_)));
    }
}
