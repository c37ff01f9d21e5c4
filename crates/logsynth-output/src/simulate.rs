//! Pipeline-test events file output.
//!
//! Records are held in memory and written as one
//! `{"events":[{"message":"..."},...]}` document when the file is closed.
//! In directory mode every interval produces its own document.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::OutputError;
use crate::rally::Message;
use crate::target::{FileTarget, TargetConfig};
use crate::Output;

pub const NAME: &str = "simulate";

#[derive(Serialize)]
struct Events<'a> {
    events: Vec<Message<'a>>,
}

#[derive(Debug)]
pub struct SimulateOutput {
    target: FileTarget,
    messages: Vec<String>,
}

impl SimulateOutput {
    pub async fn new(config: TargetConfig) -> Result<Self, OutputError> {
        let target = FileTarget::open(config.destination()?).await?;
        Ok(Self {
            target,
            messages: Vec::new(),
        })
    }

    async fn flush_events(&mut self) -> Result<(), OutputError> {
        let events = Events {
            events: self
                .messages
                .iter()
                .map(|message| Message { message })
                .collect(),
        };
        let mut document = serde_json::to_vec(&events)?;
        document.push(b'\n');
        self.target.write_all(&document).await?;
        self.messages.clear();
        Ok(())
    }
}

#[async_trait]
impl Output for SimulateOutput {
    async fn write(&mut self, record: &[u8]) -> Result<usize, OutputError> {
        if self.target.is_closed() {
            return Err(OutputError::Closed);
        }
        self.messages
            .push(String::from_utf8_lossy(record).into_owned());
        Ok(record.len())
    }

    async fn new_interval(&mut self) -> Result<(), OutputError> {
        if !self.target.rotates() {
            return Ok(());
        }
        self.flush_events().await?;
        self.target.reopen().await
    }

    async fn close(&mut self) -> Result<(), OutputError> {
        if self.target.is_closed() {
            return Ok(());
        }
        self.flush_events().await?;
        self.target.close().await
    }
}
