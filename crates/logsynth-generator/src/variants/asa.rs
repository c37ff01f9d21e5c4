//! Cisco ASA firewall messages.
//!
//! ```yaml
//! generator:
//!   type: cisco:asa
//!   include_timestamp: true
//! ```
//!
//! Each record is one of four message types (106023, 302013, 302014,
//! 305011), chosen as part of the randomized state. State is randomized at
//! construction; each record is rendered before the next randomization.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;

use crate::generator::{parse_config, BuildContext, Clock, Generator, GeneratorError};
use crate::template::{Fields, Template, TemplateError};
use crate::values::{network, pick};

pub const NAME: &str = "cisco:asa";

const PREFIX: &str = "{?timestamp}{timestamp}: {/timestamp}";

const TEMPLATES: [&str; 4] = [
    r#"%ASA-4-106023: Deny {protocol|lower} src {src_int}:{src_addr}/{src_port} dst {dst_int}:{dst_addr}/{dst_port} type {type} code {code} by {access_group|lower} "{acl_id}" [0x8ed66b60, 0xf8852875]"#,
    "%ASA-6-302013: Built {direction} TCP connection {connection_id} for {src_int}:{src_addr}/{src_port} ({map1_addr}/{map1_port}) to {dst_int}:{dst_addr}/{dst_port} ({map2_addr}/{map2_port})",
    "%ASA-6-302014: Teardown TCP connection {connection_id} for {src_int}:{src_addr}/{src_port} to {dst_int}:{dst_addr}/{dst_port} duration {duration} bytes {bytes} {reason}",
    "%ASA-6-305011: Built {translation_type} {protocol} translation from {src_int}:{src_addr}/{src_port} to {dst_int}:{dst_addr}/{dst_port}",
];

const TIMESTAMP_FORMAT: &str = "%b %d %Y %I:%M:%S";

const SRC_INT: &str = "SrcInt";
const DST_INT: &str = "DstInt";
const ACCESS_GROUP: &str = "Access-Group";
const ACL_ID: &str = "AclId";

const DIRECTIONS: &[&str] = &["inbound", "outbound"];
const PROTOCOLS: &[&str] = &["TCP", "UDP"];
const TRANSLATION_TYPES: &[&str] = &["dynamic", "static"];
const REASONS: &[&str] = &[
    "Conn-timeout",
    "Deny Terminate",
    "Failover primary closed",
    "FIN Timeout",
    "Flow closed by inspection",
    "Flow terminated by IPS",
    "Flow reset by IPS",
    "Flow terminated by TCP Intercept",
    "Flow timed out",
    "Flow timed out with reset",
    "Flow is a loopback",
    "Free the flow created as result of packet injection",
    "Invalid SYN",
    "IPS fail-close",
    "No interfaces associated with zone",
    "No valid adjacency",
    "Pinhole Timeout",
    "Probe maximum retries of retransmission exceeded",
    "Probe maximum retransmission time elapsed",
    "Probe received RST",
    "Probe received FIN",
    "Probe completed",
    "Route change",
    "SYN Control",
    "SYN Timeout",
    "TCP bad retransmission",
    "TCP FINs",
    "TCP Invalid SYN",
    "TCP Reset - APPLIANCE",
    "TCP Reset - I",
    "TCP Reset - O",
    "TCP segment partial overlap",
    "TCP unexpected window size variation",
    "Tunnel has been torn down",
    "Unauth Deny",
    "Unknown",
    "Xlate Clear",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AsaConfig {
    /// Prefix each message with `MMM DD YYYY hh:mm:ss: `
    pub include_timestamp: bool,
}

/// Fields shared by all four message types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsaRecord {
    /// Index into the message templates
    pub template: usize,
    /// Empty unless timestamps are enabled
    pub timestamp: String,
    pub protocol: &'static str,
    pub translation_type: &'static str,
    pub connection_id: u32,
    pub duration: String,
    pub bytes: u32,
    pub reason: &'static str,
    pub src_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_addr: Ipv4Addr,
    pub dst_port: u16,
    pub icmp_type: u32,
    pub icmp_code: u32,
    pub direction: &'static str,
    pub map1_addr: Ipv4Addr,
    pub map1_port: u16,
    pub map2_addr: Ipv4Addr,
    pub map2_port: u16,
}

impl Default for AsaRecord {
    fn default() -> Self {
        Self {
            template: 0,
            timestamp: String::new(),
            protocol: PROTOCOLS[0],
            translation_type: TRANSLATION_TYPES[0],
            connection_id: 0,
            duration: String::new(),
            bytes: 0,
            reason: REASONS[0],
            src_addr: Ipv4Addr::UNSPECIFIED,
            src_port: 0,
            dst_addr: Ipv4Addr::UNSPECIFIED,
            dst_port: 0,
            icmp_type: 0,
            icmp_code: 0,
            direction: DIRECTIONS[0],
            map1_addr: Ipv4Addr::UNSPECIFIED,
            map1_port: 0,
            map2_addr: Ipv4Addr::UNSPECIFIED,
            map2_port: 0,
        }
    }
}

impl Fields for AsaRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let borrowed = |value: &'static str| Some(Cow::Borrowed(value));
        let value = match name {
            "timestamp" => return Some(Cow::Borrowed(self.timestamp.as_str())),
            "duration" => return Some(Cow::Borrowed(self.duration.as_str())),
            "src_int" => return borrowed(SRC_INT),
            "dst_int" => return borrowed(DST_INT),
            "access_group" => return borrowed(ACCESS_GROUP),
            "acl_id" => return borrowed(ACL_ID),
            "protocol" => return borrowed(self.protocol),
            "translation_type" => return borrowed(self.translation_type),
            "reason" => return borrowed(self.reason),
            "direction" => return borrowed(self.direction),
            "connection_id" => self.connection_id.to_string(),
            "bytes" => self.bytes.to_string(),
            "src_addr" => self.src_addr.to_string(),
            "src_port" => self.src_port.to_string(),
            "dst_addr" => self.dst_addr.to_string(),
            "dst_port" => self.dst_port.to_string(),
            "type" => self.icmp_type.to_string(),
            "code" => self.icmp_code.to_string(),
            "map1_addr" => self.map1_addr.to_string(),
            "map1_port" => self.map1_port.to_string(),
            "map2_addr" => self.map2_addr.to_string(),
            "map2_port" => self.map2_port.to_string(),
            _ => return None,
        };
        Some(Cow::Owned(value))
    }
}

/// Cisco ASA generator.
pub struct Asa<R: Rng = StdRng> {
    config: AsaConfig,
    templates: Vec<Template>,
    record: AsaRecord,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> Asa<R> {
    pub fn new(config: AsaConfig, rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let record = AsaRecord::default();
        let templates = TEMPLATES
            .iter()
            .map(|body| -> Result<Template, TemplateError> {
                let template = Template::parse(&format!("{PREFIX}{body}"))?;
                template.verify(&record)?;
                Ok(template)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(GeneratorError::Template)?;

        let mut asa = Self {
            config,
            templates,
            record,
            clock,
            rng,
        };
        asa.randomize();
        Ok(asa)
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let record = &mut self.record;

        record.template = rng.gen_range(0..self.templates.len());
        record.protocol = *pick(rng, PROTOCOLS);
        record.translation_type = *pick(rng, TRANSLATION_TYPES);
        record.connection_id = rng.gen_range(0..65536);
        let hours = rng.gen_range(0..4u32);
        let minutes = rng.gen_range(0..60u32);
        let seconds = rng.gen_range(0..60u32);
        record.duration = format!("{hours}:{minutes:02}:{seconds:02}");
        record.bytes = rng.gen_range(0..65536);
        record.reason = *pick(rng, REASONS);
        record.src_addr = network::ipv4(rng);
        record.src_port = network::port(rng);
        record.dst_addr = network::ipv4(rng);
        record.dst_port = network::port(rng);
        record.icmp_type = rng.gen_range(0..64);
        record.icmp_code = rng.gen_range(0..64);
        record.direction = *pick(rng, DIRECTIONS);
        record.map1_addr = network::ipv4(rng);
        record.map1_port = network::port(rng);
        record.map2_addr = network::ipv4(rng);
        record.map2_port = network::port(rng);
        record.timestamp = if self.config.include_timestamp {
            self.clock.now().format(TIMESTAMP_FORMAT).to_string()
        } else {
            String::new()
        };
    }
}

impl<R: Rng + Send> Generator for Asa<R> {
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError> {
        let rendered = self.templates[self.record.template]
            .render(&self.record)
            .map_err(GeneratorError::Render)?;
        self.randomize();
        Ok(rendered.into_bytes())
    }
}

pub fn construct(
    config: &serde_yaml::Value,
    ctx: BuildContext,
) -> Result<Box<dyn Generator>, GeneratorError> {
    let config: AsaConfig = parse_config(config)?;
    Ok(Box::new(Asa::new(config, ctx.rng, ctx.clock)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap())
    }

    fn render_with(template: usize, include_timestamp: bool) -> String {
        let config = AsaConfig { include_timestamp };
        let mut asa = Asa::new(config, StdRng::seed_from_u64(1), fixed_clock()).unwrap();
        asa.record.template = template;
        String::from_utf8(asa.next_record().unwrap()).unwrap()
    }

    #[test]
    fn test_golden_messages_seed_one() {
        for (template, expected) in GOLDEN_SEED_ONE.iter().enumerate() {
            assert_eq!(render_with(template, false), *expected, "template {template}");
        }
    }

    #[test]
    fn test_timestamp_prefix() {
        let line = render_with(3, true);
        assert_eq!(line, format!("Jan 02 2024 03:04:05: {}", GOLDEN_SEED_ONE[3]));
    }

    #[test]
    fn test_every_template_is_used() {
        let mut asa = Asa::new(AsaConfig::default(), StdRng::seed_from_u64(42), fixed_clock())
            .unwrap();
        let mut seen = [false; 4];

        for _ in 0..100 {
            let line = String::from_utf8(asa.next_record().unwrap()).unwrap();
            let id = &line[7..13];
            let index = ["106023", "302013", "302014", "305011"]
                .iter()
                .position(|known| *known == id)
                .unwrap();
            seen[index] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("{type: cisco:asa, include_timestamp: true}").unwrap();
        let mut generator = construct(&yaml, BuildContext::seeded(1).with_clock(fixed_clock()))
            .unwrap();
        let line = String::from_utf8(generator.next_record().unwrap()).unwrap();
        assert!(line.starts_with("Jan 02 2024 03:04:05: %ASA-"));

        let yaml: serde_yaml::Value =
            serde_yaml::from_str("{type: cisco:asa, include_timestamp: sometimes}").unwrap();
        assert!(matches!(
            construct(&yaml, BuildContext::seeded(1)),
            Err(GeneratorError::Config(_))
        ));
    }

    const GOLDEN_SEED_ONE: [&str; 4] = [
        r#"%ASA-4-106023: Deny udp src SrcInt:37.214.188.49/21614 dst DstInt:53.222.96.36/30409 type 57 code 56 by access-group "AclId" [0x8ed66b60, 0xf8852875]"#,
        "%ASA-6-302013: Built inbound TCP connection 25264 for SrcInt:37.214.188.49/21614 (8.31.91.125/9324) to DstInt:53.222.96.36/30409 (15.132.130.80/36927)",
        "%ASA-6-302014: Teardown TCP connection 25264 for SrcInt:37.214.188.49/21614 to DstInt:53.222.96.36/30409 duration 2:12:24 bytes 53063 Flow terminated by IPS",
        "%ASA-6-305011: Built static UDP translation from SrcInt:37.214.188.49/21614 to DstInt:53.222.96.36/30409",
    ];
}
