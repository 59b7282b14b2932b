use std::{
    fs::{self, File},
    io::{self, BufWriter, Write as _},
    path::Path,
};

use anyhow::Context;
use flexi_logger::{FileSpec, Logger, LoggerHandle, WriteMode};

/// Where log records go.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    /// Standard error, for headless commands.
    Stderr,
    /// A log file in the given directory, so the terminal UI stays clean.
    File(&'a Path),
}

/// Starts the global logger.
///
/// `RUST_LOG` takes precedence over `level`. The returned handle must be
/// kept alive until the program exits.
pub fn init_logger(level: &str, target: LogTarget<'_>) -> anyhow::Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str(level)
        .with_context(|| format!("Invalid log level: {level}"))?
        .write_mode(WriteMode::BufferAndFlush);
    let logger = match target {
        LogTarget::Stderr => logger.log_to_stderr(),
        LogTarget::File(dir) => logger
            .log_to_file(
                FileSpec::default()
                    .directory(dir)
                    .basename("sweet-galaxy")
                    .suppress_timestamp(),
            )
            .append()
            .format(flexi_logger::detailed_format),
    };
    logger.start().context("Failed to start logger")
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Writes `value` as pretty JSON, creating parent directories as needed.
pub fn write_json_file<T, P>(file_kind: &str, path: P, value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create {} file: {}", file_kind, path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;
    writeln!(writer)
        .with_context(|| format!("Failed to write newline after JSON to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {}", path.display()))?;

    Ok(())
}
