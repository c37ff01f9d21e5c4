//! AWS Network Firewall log records, encoded as JSON.
//!
//! ```yaml
//! generator:
//!   type: aws:firewall
//!   event_type: netflow   # or alert; random per record when omitted
//! ```
//!
//! Alert events on TCP carry a `tcp` object, and some of those an `http`
//! object as well. Sub-objects that do not apply are left out of the
//! document entirely.

use std::net::Ipv4Addr;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::generator::{parse_config, BuildContext, Clock, Generator, GeneratorError};
use crate::values::{http, network, pick};

pub const NAME: &str = "aws:firewall";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

const PROTOCOLS: &[&str] = &["ICMP", "TCP", "UDP"];
const TCP_APP_PROTOS: &[&str] = &["", "http"];
const ALERT_ACTIONS: &[&str] = &["allowed", "blocked"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Alert,
    Netflow,
}

impl EventType {
    const ALL: [EventType; 2] = [EventType::Alert, EventType::Netflow];

    fn parse(value: &str) -> Result<Self, GeneratorError> {
        match value {
            "alert" => Ok(EventType::Alert),
            "netflow" => Ok(EventType::Netflow),
            other => Err(GeneratorError::InvalidValue {
                field: "event_type",
                value: other.to_string(),
                expected: "'alert, netflow'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirewallConfig {
    /// Pin every record to one event type
    pub event_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpData {
    pub hostname: String,
    #[serde(rename = "URL")]
    pub url: String,
    pub http_user_agent: &'static str,
    pub http_method: &'static str,
    pub protocol: &'static str,
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertData {
    pub action: &'static str,
    pub signature_id: u32,
    pub rev: u32,
    pub signature: String,
    pub category: String,
    pub severity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetflowData {
    pub pkts: u32,
    pub bytes: u32,
    pub start: String,
    pub end: String,
    pub age: i64,
    pub min_ttl: u8,
    pub max_ttl: u8,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TcpData {
    pub tcp_flags: String,
    #[serde(skip_serializing_if = "is_false")]
    pub fin: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub syn: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub rst: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub psh: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub ack: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub urg: bool,
}

impl TcpData {
    fn from_flags(flags: u8) -> Self {
        Self {
            tcp_flags: format!("{flags:02}"),
            fin: flags & 1 != 0,
            syn: flags & (1 << 1) != 0,
            rst: flags & (1 << 2) != 0,
            psh: flags & (1 << 3) != 0,
            ack: flags & (1 << 4) != 0,
            urg: flags & (1 << 5) != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventData {
    pub timestamp: String,
    pub flow_id: i64,
    pub event_type: EventType,
    pub src_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_ip: Ipv4Addr,
    pub dst_port: u16,
    pub proto: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub app_proto: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<AlertData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netflow: Option<NetflowData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp: Option<TcpData>,
}

/// One firewall log document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirewallRecord {
    pub firewall_name: String,
    pub availability_zone: &'static str,
    pub event: EventData,
    pub event_timestamp: String,
}

/// AWS Network Firewall generator.
pub struct AwsFirewall<R: Rng = StdRng> {
    event_type: Option<EventType>,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> AwsFirewall<R> {
    pub fn new(config: FirewallConfig, rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let event_type = match config.event_type.as_deref() {
            None | Some("") => None,
            Some(value) => Some(EventType::parse(value)?),
        };

        Ok(Self {
            event_type,
            clock,
            rng,
        })
    }

    /// Draw the next document.
    pub fn randomize(&mut self) -> FirewallRecord {
        let now = self.clock.now();
        let rng = &mut self.rng;

        let firewall_name = format!("Firewall-{}", rng.gen_range(0..100u32));
        let availability_zone = http::availability_zone(rng);
        let mut event = EventData {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            flow_id: rng.gen_range(0..i64::MAX),
            event_type: EventType::Alert,
            src_ip: network::ipv4(rng),
            src_port: network::port(rng),
            dst_ip: network::ipv4(rng),
            dst_port: network::port(rng),
            proto: *pick(rng, PROTOCOLS),
            app_proto: "",
            alert: None,
            netflow: None,
            http: None,
            tcp: None,
        };
        event.event_type = match self.event_type {
            Some(pinned) => pinned,
            None => *pick(rng, &EventType::ALL),
        };

        match event.event_type {
            EventType::Alert => randomize_alert(&mut event, rng),
            EventType::Netflow => randomize_netflow(&mut event, now, rng),
        }

        FirewallRecord {
            firewall_name,
            availability_zone,
            event,
            event_timestamp: now.timestamp().to_string(),
        }
    }
}

fn randomize_alert<R: Rng>(event: &mut EventData, rng: &mut R) {
    let signature_id = rng.gen_range(0..1024);
    event.alert = Some(AlertData {
        action: *pick(rng, ALERT_ACTIONS),
        signature_id,
        rev: rng.gen_range(0..1024),
        signature: format!("Signature-{signature_id}"),
        category: format!("Category-{}", rng.gen_range(0..100u32)),
        severity: rng.gen_range(0..6),
    });

    if event.proto != "TCP" {
        return;
    }

    event.app_proto = *pick(rng, TCP_APP_PROTOS);
    event.tcp = Some(TcpData::from_flags(rng.gen_range(0..64)));

    if event.app_proto == "http" {
        event.http = Some(HttpData {
            hostname: format!("HTTPHost-{}", rng.gen_range(0..100u32)),
            url: format!("/random-{}.html", rng.gen_range(0..100u32)),
            http_user_agent: http::user_agent(rng),
            http_method: http::method(rng),
            protocol: http::version(rng),
            length: rng.gen_range(0..1024),
        });
    }
}

fn randomize_netflow<R: Rng>(event: &mut EventData, now: DateTime<Utc>, rng: &mut R) {
    let ttl = rng.gen_range(0..=u8::MAX);
    let start = now - Duration::minutes(rng.gen_range(0..60));
    let pkts = rng.gen_range(0..100);
    let bytes = pkts * rng.gen_range(0..1024) + 1;

    event.netflow = Some(NetflowData {
        pkts,
        bytes,
        start: start.format(TIMESTAMP_FORMAT).to_string(),
        end: now.format(TIMESTAMP_FORMAT).to_string(),
        age: (now - start).num_seconds(),
        min_ttl: ttl,
        max_ttl: ttl,
    });
}

impl<R: Rng + Send> Generator for AwsFirewall<R> {
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError> {
        let record = self.randomize();
        Ok(serde_json::to_vec(&record)?)
    }
}

pub fn construct(
    config: &serde_yaml::Value,
    ctx: BuildContext,
) -> Result<Box<dyn Generator>, GeneratorError> {
    let config: FirewallConfig = parse_config(config)?;
    Ok(Box::new(AwsFirewall::new(config, ctx.rng, ctx.clock)?))
}
