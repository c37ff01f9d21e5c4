//! Plain file output.
//!
//! ```yaml
//! output:
//!   type: file
//!   directory: /var/tmp
//!   pattern: "vpcflow_*.log"
//!   delimiter: "\n"
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::OutputError;
use crate::target::{FileTarget, TargetConfig};
use crate::Output;

pub const NAME: &str = "file";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    #[serde(flatten)]
    pub target: TargetConfig,
    /// Written after every record
    pub delimiter: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            delimiter: "\n".to_string(),
        }
    }
}

/// Writes each record followed by the delimiter.
#[derive(Debug)]
pub struct FileOutput {
    target: FileTarget,
    delimiter: String,
}

impl FileOutput {
    pub async fn new(config: FileConfig) -> Result<Self, OutputError> {
        let target = FileTarget::open(config.target.destination()?).await?;
        Ok(Self {
            target,
            delimiter: config.delimiter,
        })
    }
}

#[async_trait]
impl Output for FileOutput {
    async fn write(&mut self, record: &[u8]) -> Result<usize, OutputError> {
        self.target.write_all(record).await?;
        self.target.write_all(self.delimiter.as_bytes()).await?;
        Ok(record.len() + self.delimiter.len())
    }

    async fn new_interval(&mut self) -> Result<(), OutputError> {
        self.target.reopen().await
    }

    async fn close(&mut self) -> Result<(), OutputError> {
        self.target.close().await
    }
}
