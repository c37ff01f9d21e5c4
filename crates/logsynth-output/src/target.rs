//! Files written by the file-backed outputs (`file`, `rally`, `simulate`).
//!
//! A target is either one fixed `filename` or a `directory` plus a file
//! name `pattern`. In the pattern the last `*` is replaced by a random
//! string; without a `*` the random string is appended.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::OutputError;

/// Attempts at finding an unused name before giving up.
const CREATE_ATTEMPTS: usize = 10_000;

/// The `filename` / `directory` / `pattern` fields shared by file outputs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub filename: Option<String>,
    pub directory: Option<String>,
    pub pattern: Option<String>,
}

/// A validated target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Filename(PathBuf),
    Pattern { directory: PathBuf, pattern: String },
}

impl TargetConfig {
    /// Check that exactly one of the two forms is configured.
    pub fn destination(&self) -> Result<Destination, OutputError> {
        fn set(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|s| !s.is_empty())
        }

        match (set(&self.filename), set(&self.directory), set(&self.pattern)) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(OutputError::Config(
                "if filename is set, directory and pattern must not be".to_string(),
            )),
            (Some(filename), None, None) => Ok(Destination::Filename(PathBuf::from(filename))),
            (None, Some(directory), Some(pattern)) => {
                if pattern.contains(std::path::MAIN_SEPARATOR) || pattern.contains('/') {
                    return Err(OutputError::Config(format!(
                        "pattern '{pattern}' must not contain a path separator"
                    )));
                }
                Ok(Destination::Pattern {
                    directory: PathBuf::from(directory),
                    pattern: pattern.to_string(),
                })
            }
            (None, Some(_), None) | (None, None, Some(_)) => Err(OutputError::Config(
                "directory and pattern must both be set".to_string(),
            )),
            (None, None, None) => Err(OutputError::Config(
                "you must specify filename or directory and pattern".to_string(),
            )),
        }
    }
}

/// An open output file plus the rule for opening the next one.
#[derive(Debug)]
pub struct FileTarget {
    destination: Destination,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileTarget {
    /// Open the first file. A fixed `filename` is truncated.
    pub async fn open(destination: Destination) -> Result<Self, OutputError> {
        let (path, file) = match &destination {
            Destination::Filename(path) => (path.clone(), File::create(path).await?),
            Destination::Pattern { directory, pattern } => {
                create_unique(directory, pattern).await?
            }
        };
        debug!("Opened output file {}", path.display());

        Ok(Self {
            destination,
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Path of the file currently (or last) written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `reopen` starts a differently named file.
    pub fn rotates(&self) -> bool {
        matches!(self.destination, Destination::Pattern { .. })
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    pub async fn write_all(&mut self, buf: &[u8]) -> Result<(), OutputError> {
        let writer = self.writer.as_mut().ok_or(OutputError::Closed)?;
        writer.write_all(buf).await?;
        Ok(())
    }

    /// Close the current file and open the next one.
    ///
    /// With a pattern the next file gets a fresh name. A fixed `filename`
    /// is reopened for appending.
    pub async fn reopen(&mut self) -> Result<(), OutputError> {
        self.close().await?;

        let (path, file) = match &self.destination {
            Destination::Filename(path) => {
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .await?;
                (path.clone(), file)
            }
            Destination::Pattern { directory, pattern } => {
                create_unique(directory, pattern).await?
            }
        };
        debug!("Reopened output file {}", path.display());

        self.path = path;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Flush and close. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<(), OutputError> {
        if let Some(mut writer) = self.writer.take() {
            writer.shutdown().await?;
        }
        Ok(())
    }
}

fn fill_pattern(pattern: &str, random: &str) -> String {
    match pattern.rfind('*') {
        Some(pos) => format!("{}{}{}", &pattern[..pos], random, &pattern[pos + 1..]),
        None => format!("{pattern}{random}"),
    }
}

async fn create_unique(directory: &Path, pattern: &str) -> Result<(PathBuf, File), OutputError> {
    for _ in 0..CREATE_ATTEMPTS {
        let random = rand::thread_rng().gen::<u32>().to_string();
        let path = directory.join(fill_pattern(pattern, &random));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(OutputError::Config(format!(
        "no unused file name for pattern '{pattern}' in {}",
        directory.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn target(
        filename: Option<&str>,
        directory: Option<&str>,
        pattern: Option<&str>,
    ) -> TargetConfig {
        TargetConfig {
            filename: filename.map(str::to_string),
            directory: directory.map(str::to_string),
            pattern: pattern.map(str::to_string),
        }
    }

    #[test]
    fn test_destination_errors() {
        let cases = [
            (
                target(Some("a"), Some("/tmp"), None),
                "if filename is set, directory and pattern must not be",
            ),
            (
                target(Some("a"), None, Some("x_*")),
                "if filename is set, directory and pattern must not be",
            ),
            (
                target(None, Some("/tmp"), None),
                "directory and pattern must both be set",
            ),
            (
                target(None, None, Some("x_*")),
                "directory and pattern must both be set",
            ),
            (
                target(None, None, None),
                "you must specify filename or directory and pattern",
            ),
            (
                target(Some(""), Some(""), Some("")),
                "you must specify filename or directory and pattern",
            ),
        ];
        for (config, message) in cases {
            let err = config.destination().unwrap_err();
            assert_eq!(err.to_string(), format!("invalid output configuration: {message}"));
        }
    }

    #[test]
    fn test_pattern_rejects_separator() {
        let err = target(None, Some("/tmp"), Some("a/b_*"))
            .destination()
            .unwrap_err();
        assert!(err.to_string().contains("path separator"));
    }

    #[test]
    fn test_fill_pattern_uses_last_star() {
        assert_eq!(fill_pattern("log_*.txt", "123"), "log_123.txt");
        assert_eq!(fill_pattern("a*b*c", "9"), "a*b9c");
        assert_eq!(fill_pattern("plain", "9"), "plain9");
    }

    #[tokio::test]
    async fn test_pattern_files_are_fresh() {
        let dir = TempDir::new().unwrap();
        let destination = Destination::Pattern {
            directory: dir.path().to_path_buf(),
            pattern: "flow_*.log".to_string(),
        };

        let mut target = FileTarget::open(destination).await.unwrap();
        assert!(target.rotates());
        let first = target.path().to_path_buf();
        target.write_all(b"one").await.unwrap();
        target.reopen().await.unwrap();
        let second = target.path().to_path_buf();
        target.write_all(b"two").await.unwrap();
        target.close().await.unwrap();

        assert_ne!(first, second);
        for path in [&first, &second] {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("flow_") && name.ends_with(".log"), "{name}");
        }
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_filename_reopen_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, b"stale").unwrap();

        let mut target = FileTarget::open(Destination::Filename(path.clone()))
            .await
            .unwrap();
        assert!(!target.rotates());
        target.write_all(b"a").await.unwrap();
        target.reopen().await.unwrap();
        target.write_all(b"b").await.unwrap();
        target.close().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"ab");
    }

    #[tokio::test]
    async fn test_write_after_close() {
        let dir = TempDir::new().unwrap();
        let mut target = FileTarget::open(Destination::Filename(dir.path().join("x")))
            .await
            .unwrap();
        target.close().await.unwrap();
        target.close().await.unwrap();
        assert!(target.is_closed());
        assert!(matches!(
            target.write_all(b"late").await,
            Err(OutputError::Closed)
        ));
    }
}
