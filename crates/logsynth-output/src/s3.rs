//! Gzip-compressed S3 object output.
//!
//! ```yaml
//! output:
//!   type: s3
//!   bucket: my-bucket
//!   region: us-east-1
//!   prefix: vpcflow        # key: vpcflow_<unix nanos>_<nnn>.gz
//!   delimiter: "\n"
//! ```
//!
//! Credentials come from the default AWS provider chain. Records are
//! compressed in memory; the object is uploaded on `close`, and on every
//! `new_interval` a finished object is uploaded and a new key started.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::OutputError;
use crate::Output;

pub const NAME: &str = "s3";

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub prefix: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    "\n".to_string()
}

impl S3Config {
    fn validate(&self) -> Result<(), OutputError> {
        for (field, value) in [
            ("bucket", &self.bucket),
            ("region", &self.region),
            ("prefix", &self.prefix),
        ] {
            if value.is_empty() {
                return Err(OutputError::Config(format!(
                    "missing required field '{field}'"
                )));
            }
        }
        Ok(())
    }
}

/// Object key for an upload started at `unix_nanos`.
pub fn object_key(prefix: &str, unix_nanos: u128, suffix: u32) -> String {
    format!("{prefix}_{unix_nanos:019}_{suffix:03}.gz")
}

fn next_key(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    object_key(prefix, nanos, rand::thread_rng().gen_range(0..1000))
}

/// Records and delimiters compressed into memory.
pub struct GzipBuffer {
    encoder: GzEncoder<Vec<u8>>,
    delimiter: Vec<u8>,
}

impl GzipBuffer {
    pub fn new(delimiter: &str) -> Self {
        Self {
            encoder: GzEncoder::new(Vec::new(), Compression::default()),
            delimiter: delimiter.as_bytes().to_vec(),
        }
    }

    pub fn push(&mut self, record: &[u8]) -> std::io::Result<usize> {
        self.encoder.write_all(record)?;
        self.encoder.write_all(&self.delimiter)?;
        Ok(record.len() + self.delimiter.len())
    }

    /// The complete gzip stream.
    pub fn finish(self) -> std::io::Result<Vec<u8>> {
        self.encoder.finish()
    }
}

pub struct S3Output {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
    delimiter: String,
    key: String,
    buffer: Option<GzipBuffer>,
}

impl S3Output {
    pub async fn new(config: S3Config) -> Result<Self, OutputError> {
        config.validate()?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        let client = aws_sdk_s3::Client::new(&sdk_config);

        Ok(Self {
            client,
            key: next_key(&config.prefix),
            buffer: Some(GzipBuffer::new(&config.delimiter)),
            bucket: config.bucket,
            prefix: config.prefix,
            delimiter: config.delimiter,
        })
    }
}

async fn upload(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    buffer: GzipBuffer,
) -> Result<(), OutputError> {
    let body = buffer.finish()?;
    let size = body.len();
    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .send()
        .await
        .map_err(|err| OutputError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: DisplayErrorContext(&err).to_string(),
        })?;
    info!("Uploaded {} bytes to s3://{}/{}", size, bucket, key);
    Ok(())
}

#[async_trait]
impl Output for S3Output {
    async fn write(&mut self, record: &[u8]) -> Result<usize, OutputError> {
        let buffer = self.buffer.as_mut().ok_or(OutputError::Closed)?;
        Ok(buffer.push(record)?)
    }

    async fn new_interval(&mut self) -> Result<(), OutputError> {
        let buffer = self.buffer.take().ok_or(OutputError::Closed)?;
        let key = std::mem::replace(&mut self.key, next_key(&self.prefix));
        self.buffer = Some(GzipBuffer::new(&self.delimiter));
        debug!("Rotating S3 object {} to {}", key, self.key);
        upload(&self.client, &self.bucket, &key, buffer).await
    }

    async fn close(&mut self) -> Result<(), OutputError> {
        match self.buffer.take() {
            Some(buffer) => upload(&self.client, &self.bucket, &self.key, buffer).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            object_key("vpcflow", 1_709_294_400_000_000_000, 7),
            "vpcflow_1709294400000000000_007.gz"
        );
        assert_eq!(object_key("p", 42, 999), "p_0000000000000000042_999.gz");
    }

    #[test]
    fn test_next_key_uses_prefix() {
        let key = next_key("logs");
        let parts: Vec<&str> = key.trim_end_matches(".gz").split('_').collect();
        assert_eq!(parts[0], "logs");
        assert_eq!(parts[1].len(), 19);
        assert_eq!(parts[2].len(), 3);
    }

    #[test]
    fn test_gzip_buffer_holds_delimited_records() {
        let mut buffer = GzipBuffer::new("\n");
        assert_eq!(buffer.push(b"first").unwrap(), 6);
        buffer.push(b"second").unwrap();
        let compressed = buffer.finish().unwrap();

        let mut plain = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut plain)
            .unwrap();
        assert_eq!(plain, "first\nsecond\n");
    }

    #[test]
    fn test_config_requires_fields() {
        let err = serde_yaml::from_str::<S3Config>("bucket: b\nregion: r")
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing field `prefix`"), "{err}");

        let config: S3Config = serde_yaml::from_str("bucket: b\nregion: r\nprefix: ''").unwrap();
        assert_eq!(config.delimiter, "\n");
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "invalid output configuration: missing required field 'prefix'"
        );
    }
}
