//! Remote syslog output over TCP or UDP.
//!
//! ```yaml
//! output:
//!   type: syslog
//!   network: udp
//!   host: localhost
//!   port: 514
//!   facility: LOG_LOCAL0   # default LOG_KERN
//!   severity: LOG_INFO     # default LOG_EMERG
//!   tag: logsynth          # default: the program name
//! ```
//!
//! Every record is sent as `<PRI>TIMESTAMP HOSTNAME TAG[PID]: MESSAGE`
//! terminated by a newline.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

use crate::error::OutputError;
use crate::Output;

pub const NAME: &str = "syslog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Tcp,
    Udp,
}

/// Syslog facility, named as in `<syslog.h>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Facility {
    #[default]
    LogKern,
    LogUser,
    LogMail,
    LogDaemon,
    LogAuth,
    LogSyslog,
    LogLpr,
    LogNews,
    LogUucp,
    LogCron,
    LogAuthpriv,
    LogFtp,
    LogLocal0,
    LogLocal1,
    LogLocal2,
    LogLocal3,
    LogLocal4,
    LogLocal5,
    LogLocal6,
    LogLocal7,
}

impl Facility {
    pub fn code(self) -> u8 {
        let number = match self {
            Facility::LogKern => 0,
            Facility::LogUser => 1,
            Facility::LogMail => 2,
            Facility::LogDaemon => 3,
            Facility::LogAuth => 4,
            Facility::LogSyslog => 5,
            Facility::LogLpr => 6,
            Facility::LogNews => 7,
            Facility::LogUucp => 8,
            Facility::LogCron => 9,
            Facility::LogAuthpriv => 10,
            Facility::LogFtp => 11,
            Facility::LogLocal0 => 16,
            Facility::LogLocal1 => 17,
            Facility::LogLocal2 => 18,
            Facility::LogLocal3 => 19,
            Facility::LogLocal4 => 20,
            Facility::LogLocal5 => 21,
            Facility::LogLocal6 => 22,
            Facility::LogLocal7 => 23,
        };
        number << 3
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    #[default]
    LogEmerg,
    LogAlert,
    LogCrit,
    LogErr,
    LogWarning,
    LogNotice,
    LogInfo,
    LogDebug,
}

impl Severity {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyslogConfig {
    pub network: Network,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub facility: Facility,
    #[serde(default)]
    pub severity: Severity,
    pub tag: Option<String>,
}

enum Transport {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

pub struct SyslogOutput {
    transport: Option<Transport>,
    priority: u8,
    hostname: String,
    tag: String,
    pid: u32,
}

impl SyslogOutput {
    pub async fn new(config: SyslogConfig) -> Result<Self, OutputError> {
        if config.host.is_empty() {
            return Err(OutputError::Config(
                "missing required field 'host'".to_string(),
            ));
        }

        let transport = match config.network {
            Network::Tcp => {
                Transport::Tcp(TcpStream::connect((config.host.as_str(), config.port)).await?)
            }
            Network::Udp => {
                let remote = resolve(&config.host, config.port).await?;
                let local: SocketAddr = match remote {
                    SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
                    SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
                };
                let socket = UdpSocket::bind(local).await?;
                socket.connect(remote).await?;
                Transport::Udp(socket)
            }
        };
        debug!(
            "Connected syslog output to {}:{} over {:?}",
            config.host, config.port, config.network
        );

        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            transport: Some(transport),
            priority: config.facility.code() | config.severity.code(),
            hostname,
            tag: config.tag.unwrap_or_else(program_name),
            pid: std::process::id(),
        })
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, OutputError> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| OutputError::Config(format!("host '{host}' did not resolve")))
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .map(std::path::PathBuf::from)
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "logsynth".to_string())
}

/// Build one syslog frame. A trailing newline is added unless the message
/// already ends with one.
pub fn frame<Tz: TimeZone>(
    priority: u8,
    timestamp: &DateTime<Tz>,
    hostname: &str,
    tag: &str,
    pid: u32,
    message: &[u8],
) -> Vec<u8>
where
    Tz::Offset: std::fmt::Display,
{
    let mut frame = format!(
        "<{priority}>{} {hostname} {tag}[{pid}]: ",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
    .into_bytes();
    frame.extend_from_slice(message);
    if !message.ends_with(b"\n") {
        frame.push(b'\n');
    }
    frame
}

#[async_trait]
impl Output for SyslogOutput {
    async fn write(&mut self, record: &[u8]) -> Result<usize, OutputError> {
        let frame = frame(
            self.priority,
            &Local::now(),
            &self.hostname,
            &self.tag,
            self.pid,
            record,
        );
        match self.transport.as_mut().ok_or(OutputError::Closed)? {
            Transport::Tcp(stream) => stream.write_all(&frame).await?,
            Transport::Udp(socket) => {
                socket.send(&frame).await?;
            }
        }
        Ok(record.len())
    }

    async fn close(&mut self) -> Result<(), OutputError> {
        if let Some(Transport::Tcp(mut stream)) = self.transport.take() {
            stream.shutdown().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn config(network: Network, port: u16) -> SyslogConfig {
        SyslogConfig {
            network,
            host: "127.0.0.1".to_string(),
            port,
            facility: Facility::LogLocal0,
            severity: Severity::LogInfo,
            tag: Some("logsynth".to_string()),
        }
    }

    #[test]
    fn test_priority_codes() {
        assert_eq!(Facility::default().code() | Severity::default().code(), 0);
        assert_eq!(Facility::LogLocal0.code() | Severity::LogInfo.code(), 134);
        assert_eq!(Facility::LogAuthpriv.code() | Severity::LogDebug.code(), 87);
    }

    #[test]
    fn test_config_names() {
        let config: SyslogConfig = serde_yaml::from_str(
            "network: tcp\nhost: localhost\nport: 514\nfacility: LOG_LOCAL7\nseverity: LOG_WARNING",
        )
        .unwrap();
        assert_eq!(config.facility, Facility::LogLocal7);
        assert_eq!(config.severity, Severity::LogWarning);
        assert_eq!(config.tag, None);

        let defaults: SyslogConfig =
            serde_yaml::from_str("network: udp\nhost: localhost\nport: 514").unwrap();
        assert_eq!(defaults.facility, Facility::LogKern);
        assert_eq!(defaults.severity, Severity::LogEmerg);
    }

    #[test]
    fn test_config_errors() {
        let err = serde_yaml::from_str::<SyslogConfig>("network: udp\nport: 514")
            .unwrap_err()
            .to_string();
        assert!(err.contains("missing field `host`"), "{err}");

        let err = serde_yaml::from_str::<SyslogConfig>("network: ip\nhost: h\nport: 514")
            .unwrap_err()
            .to_string();
        assert!(err.contains("unknown variant `ip`"), "{err}");

        let err = serde_yaml::from_str::<SyslogConfig>(
            "network: udp\nhost: h\nport: 514\nfacility: LOG_BOB",
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("LOG_KERN"), "{err}");
    }

    #[test]
    fn test_frame_layout() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap();
        let line = frame(134, &at, "host1", "logsynth", 42, b"hello");
        assert_eq!(line, b"<134>2024-03-01T12:00:00Z host1 logsynth[42]: hello\n");

        let line = frame(0, &at.with_timezone(&Utc), "h", "t", 1, b"done\n");
        assert_eq!(line, b"<0>2024-03-01T12:00:00Z h t[1]: done\n");
    }

    #[tokio::test]
    async fn test_udp_datagram_per_record() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let mut output = SyslogOutput::new(config(Network::Udp, port)).await.unwrap();
        assert_eq!(output.write(b"flow record").await.unwrap(), 11);

        let mut buf = [0u8; 1024];
        let n = server.recv(&mut buf).await.unwrap();
        let datagram = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(datagram.starts_with("<134>"), "{datagram}");
        assert!(datagram.ends_with("]: flow record\n"), "{datagram}");
        assert!(datagram.contains(&format!(" logsynth[{}]: ", std::process::id())));
        output.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_tcp_stream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let mut output = SyslogOutput::new(config(Network::Tcp, port)).await.unwrap();
        output.write(b"one").await.unwrap();
        output.write(b"two").await.unwrap();
        output.close().await.unwrap();

        let received = reader.await.unwrap();
        let lines: Vec<&str> = received.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": one"));
        assert!(lines[1].ends_with(": two"));
        assert!(matches!(output.write(b"late").await, Err(OutputError::Closed)));
    }
}
