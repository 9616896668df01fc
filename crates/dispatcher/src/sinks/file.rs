//! FileSink - appends each batch to a file named after its start time

use contracts::{Batch, BulkSink, ContractError};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// On-disk record format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileFormat {
    /// `a, b, c` followed by a newline
    #[default]
    Text,
    /// One JSON object per batch, newline-delimited
    Json,
}

impl FileFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Text => "log",
            Self::Json => "jsonl",
        }
    }
}

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output directory
    pub dir: PathBuf,
    /// Record format
    pub format: FileFormat,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            format: FileFormat::Text,
        }
    }
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let dir = params
            .get("dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let format = match params.get("format").map(String::as_str) {
            Some("json") => FileFormat::Json,
            Some("text") | None => FileFormat::Text,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        Ok(Self { dir, format })
    }
}

/// Sink that appends batches to `<dir>/bulk<unix-seconds>.log`.
///
/// Batches started within the same second share a file; appending keeps
/// both.
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
}

impl FileSink {
    /// Create a new FileSink, creating the output directory if needed
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.dir)?;

        Ok(Self {
            name: name.into(),
            config,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, String> {
        let config = FileSinkConfig::from_params(params)?;
        Self::new(name, config).map_err(|e| e.to_string())
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// File that receives `batch`
    pub fn path_for(&self, batch: &Batch) -> PathBuf {
        self.config.dir.join(format!(
            "bulk{}.{}",
            batch.unix_timestamp(),
            self.config.format.extension()
        ))
    }

    fn append(&self, path: &Path, batch: &Batch) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        match self.config.format {
            FileFormat::Text => writeln!(file, "{}", batch.joined())?,
            FileFormat::Json => {
                serde_json::to_writer(&mut file, batch)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                writeln!(file)?;
            }
        }
        file.flush()
    }

    fn persist_batch(&self, batch: &Batch) -> Result<(), ContractError> {
        let path = self.path_for(batch);
        self.append(&path, batch).map_err(|e| {
            error!(sink = %self.name, path = %path.display(), error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })?;
        debug!(sink = %self.name, path = %path.display(), "Batch appended");
        Ok(())
    }
}

impl BulkSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, batch),
        fields(sink = %self.name, started_at = batch.unix_timestamp())
    )]
    fn write(&self, batch: &Batch) -> Result<(), ContractError> {
        self.persist_batch(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use contracts::Command;
    use tempfile::tempdir;

    fn batch_at(secs: i64, items: &[&str]) -> Batch {
        Batch::new(
            Utc.timestamp_opt(secs, 0).unwrap(),
            items.iter().filter_map(|s| Command::new(*s)).collect(),
        )
    }

    #[test]
    fn test_file_sink_write() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            dir: dir.path().to_path_buf(),
            format: FileFormat::Text,
        };

        let sink = FileSink::new("test_file", config).unwrap();
        sink.write(&batch_at(1_700_000_000, &["cmd1", "cmd2"])).unwrap();

        let path = dir.path().join("bulk1700000000.log");
        assert_eq!(fs::read_to_string(path).unwrap(), "cmd1, cmd2\n");
    }

    #[test]
    fn test_same_second_appends() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            dir: dir.path().to_path_buf(),
            format: FileFormat::Text,
        };

        let sink = FileSink::new("test_file", config).unwrap();
        sink.write(&batch_at(42, &["a"])).unwrap();
        sink.write(&batch_at(42, &["b", "c"])).unwrap();

        let content = fs::read_to_string(dir.path().join("bulk42.log")).unwrap();
        assert_eq!(content, "a\nb, c\n");
    }

    #[test]
    fn test_json_format() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            dir: dir.path().to_path_buf(),
            format: FileFormat::Json,
        };

        let sink = FileSink::new("json_file", config).unwrap();
        let batch = batch_at(7, &["x", "y"]);
        sink.write(&batch).unwrap();

        let content = fs::read_to_string(dir.path().join("bulk7.jsonl")).unwrap();
        let parsed: Batch = serde_json::from_str(content.trim_end()).unwrap();
        assert_eq!(parsed, batch);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut params = HashMap::new();
        params.insert("dir".to_string(), nested.display().to_string());

        let sink = FileSink::from_params("nested", &params).unwrap();
        assert!(nested.is_dir());
        assert_eq!(sink.dir(), nested.as_path());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut params = HashMap::new();
        params.insert("format".to_string(), "xml".to_string());
        let err = FileSinkConfig::from_params(&params).unwrap_err();
        assert!(err.contains("unknown format"));
    }
}
