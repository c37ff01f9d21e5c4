//! Destinations for generated log records.
//!
//! An [`Output`] receives one record per `write` call. Runners with an
//! interval call [`Output::new_interval`] between batches; file-backed
//! outputs start a new file there. [`Output::close`] flushes whatever is
//! buffered and releases the destination.
//!
//! Outputs are built from the `output` section of a runner:
//!
//! ```yaml
//! output:
//!   type: file            # file | rally | simulate | syslog | s3
//!   filename: /tmp/flows.log
//! ```

pub mod error;
pub mod file;
pub mod rally;
pub mod s3;
pub mod simulate;
pub mod syslog;
pub mod target;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub use error::OutputError;

/// A sink for generated records.
#[async_trait]
pub trait Output: Send {
    /// Write one record. Returns the number of bytes accepted.
    async fn write(&mut self, record: &[u8]) -> Result<usize, OutputError>;

    /// Called between interval batches.
    async fn new_interval(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    /// Flush and release the destination.
    async fn close(&mut self) -> Result<(), OutputError>;
}

/// The `output` section of a runner, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputConfig {
    File(file::FileConfig),
    Rally(target::TargetConfig),
    Simulate(target::TargetConfig),
    Syslog(syslog::SyslogConfig),
    S3(s3::S3Config),
}

/// Every output type name.
pub const OUTPUT_TYPES: [&str; 5] = [
    file::NAME,
    rally::NAME,
    s3::NAME,
    simulate::NAME,
    syslog::NAME,
];

impl OutputConfig {
    pub fn name(&self) -> &'static str {
        match self {
            OutputConfig::File(_) => file::NAME,
            OutputConfig::Rally(_) => rally::NAME,
            OutputConfig::Simulate(_) => simulate::NAME,
            OutputConfig::Syslog(_) => syslog::NAME,
            OutputConfig::S3(_) => s3::NAME,
        }
    }

    /// Open the configured destination.
    pub async fn build(self) -> Result<Box<dyn Output>, OutputError> {
        debug!("Building {} output", self.name());
        let output: Box<dyn Output> = match self {
            OutputConfig::File(config) => Box::new(file::FileOutput::new(config).await?),
            OutputConfig::Rally(config) => Box::new(rally::RallyOutput::new(config).await?),
            OutputConfig::Simulate(config) => {
                Box::new(simulate::SimulateOutput::new(config).await?)
            }
            OutputConfig::Syslog(config) => Box::new(syslog::SyslogOutput::new(config).await?),
            OutputConfig::S3(config) => Box::new(s3::S3Output::new(config).await?),
        };
        Ok(output)
    }
}

/// Build an output from its raw YAML section.
pub async fn build(config: &serde_yaml::Value) -> Result<Box<dyn Output>, OutputError> {
    let config: OutputConfig = serde_yaml::from_value(config.clone())?;
    config.build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn yaml(source: &str) -> serde_yaml::Value {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn test_config_tags() {
        let cases = [
            ("type: file\nfilename: /tmp/a", "file"),
            ("type: rally\ndirectory: /tmp\npattern: r_*", "rally"),
            ("type: simulate\nfilename: /tmp/s.json", "simulate"),
            ("type: syslog\nnetwork: udp\nhost: localhost\nport: 514", "syslog"),
            ("type: s3\nbucket: b\nregion: r\nprefix: p", "s3"),
        ];
        for (source, name) in cases {
            let config: OutputConfig = serde_yaml::from_str(source).unwrap();
            assert_eq!(config.name(), name);
            assert!(OUTPUT_TYPES.contains(&name));
        }
    }

    #[test]
    fn test_unknown_type_lists_valid_values() {
        let err = tokio_test::block_on(build(&yaml("type: kafka"))).err().unwrap();
        let message = err.to_string();
        assert!(message.contains("unknown variant `kafka`"), "{message}");
        for name in OUTPUT_TYPES {
            assert!(message.contains(&format!("`{name}`")), "{message}");
        }
    }

    #[test]
    fn test_missing_type() {
        let err = tokio_test::block_on(build(&yaml("filename: /tmp/a"))).err().unwrap();
        assert!(err.to_string().contains("missing field `type`"), "{err}");
    }

    #[tokio::test]
    async fn test_target_errors_surface_from_build() {
        let err = build(&yaml("type: rally\ndirectory: /tmp")).await.err().unwrap();
        assert_eq!(
            err.to_string(),
            "invalid output configuration: directory and pattern must both be set"
        );

        let err = build(&yaml("type: file\nfilename: a\npattern: b_*"))
            .await
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "invalid output configuration: if filename is set, directory and pattern must not be"
        );

        let err = build(&yaml("type: simulate")).await.err().unwrap();
        assert_eq!(
            err.to_string(),
            "invalid output configuration: you must specify filename or directory and pattern"
        );
    }

    #[tokio::test]
    async fn test_built_file_output_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let config = yaml(&format!(
            "type: file\nfilename: '{}'\ndelimiter: '|'",
            path.display()
        ));
        let mut output = build(&config).await.unwrap();
        output.write(b"a").await.unwrap();
        output.write(b"b").await.unwrap();
        output.new_interval().await.unwrap();
        output.write(b"c").await.unwrap();
        output.close().await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a|b|c|");
    }
}
