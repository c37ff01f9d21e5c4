//! NDJSON output for Elastic Rally tracks.
//!
//! Each record becomes one `{"message":"..."}` line.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::OutputError;
use crate::target::{FileTarget, TargetConfig};
use crate::Output;

pub const NAME: &str = "rally";

/// One rally document.
#[derive(Debug, Serialize)]
pub(crate) struct Message<'a> {
    pub message: &'a str,
}

#[derive(Debug)]
pub struct RallyOutput {
    target: FileTarget,
}

impl RallyOutput {
    pub async fn new(config: TargetConfig) -> Result<Self, OutputError> {
        let target = FileTarget::open(config.destination()?).await?;
        Ok(Self { target })
    }
}

#[async_trait]
impl Output for RallyOutput {
    async fn write(&mut self, record: &[u8]) -> Result<usize, OutputError> {
        let message = String::from_utf8_lossy(record);
        let mut line = serde_json::to_vec(&Message { message: &message })?;
        line.push(b'\n');
        self.target.write_all(&line).await?;
        Ok(line.len())
    }

    async fn new_interval(&mut self) -> Result<(), OutputError> {
        self.target.reopen().await
    }

    async fn close(&mut self) -> Result<(), OutputError> {
        self.target.close().await
    }
}
