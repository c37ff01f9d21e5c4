//! Fortinet FortiGate firewall messages.
//!
//! ```yaml
//! generator:
//!   type: fortinet:firewall
//! ```
//!
//! Four message kinds are produced: event/user (FSSO logon), event/system
//! (AV database update), utm/dns (query) and traffic/forward. The kind is
//! part of the randomized state. State is randomized at construction; each
//! record is rendered before the next randomization.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use crate::generator::{BuildContext, Clock, Generator, GeneratorError};
use crate::template::{Fields, Template, TemplateError};
use crate::values::{network, pick};

pub const NAME: &str = "fortinet:firewall";

const HEADER: &str = r#"date={date} time={time} devname="{devname}" devid="{devid}" logid="{logid}" "#;

const TEMPLATES: [&str; 4] = [
    r#"type="event" subtype="user" level="{level}" vd="{vd}" eventtime={eventtime} tz="{tz}" logdesc="FSSO logon authentication status" srcip={srcip} user="{user}" server="{server}" action="FSSO-logon" msg="FSSO-logon event from FSSO_{server}: user {user} logged on {srcip}""#,
    r#"type="event" subtype="system" level="{level}" vd="{vd}" eventtime={eventtime} tz="{tz}" logdesc="FortiSandbox AV database updated" version="1.522479" msg="FortiSandbox AV database updated""#,
    r#"type="utm" subtype="dns" eventtype="dns-query" level="{level}" vd="{vd}" eventtime={eventtime} tz="{tz}" policyid={policyid} sessionid={sessionid} srcip={srcip} srcport={srcport} srcintf="{srcintf}" srcintfrole="{srcintfrole}" dstip={dstip} dstport=53 dstintf="{dstintf}" dstintfrole="{dstintfrole}" proto={proto} profile="elastictest" xid={xid} qname="{qname}" qtype="{qtype}" qtypeval=1 qclass="IN""#,
    r#"type="traffic" subtype="forward" level="{level}" vd="{vd}" eventtime={eventtime} srcip={srcip} srcport={srcport} srcintf="{srcintf}" srcintfrole="{srcintfrole}" dstip={dstip} dstport={dstport} dstintf="{dstintf}" dstintfrole="{dstintfrole}" sessionid={sessionid} proto={proto} action="{action}" policyid={policyid} policytype="policy" service="SNMP" dstcountry="Reserved" srccountry="Reserved" trandisp="noop" duration={duration} sentbyte={sentbyte} rcvdbyte={rcvdbyte} sentpkt={sentpkt} appcat="unscanned" crscore=30 craction=131072 crlevel="high""#,
];

const DEVICE_NAME: &str = "testswitch3";
const DEVICE_ID: &str = "testrouter";
const LOG_ID: &str = "0123456789";
const VDOM: &str = "root";
const TIME_ZONE: &str = "-0500";

/// Bytes per packet used to derive byte counters
const PACKET_SIZE: u64 = 1500;

const USERS: &[&str] = &[
    "user01", "user02", "user03", "user04", "user05", "user06", "user07",
];
const LEVELS: &[&str] = &["warning", "notice", "information", "error"];
const INTERFACES: &[&str] = &[
    "int0", "int1", "int2", "int3", "int4", "int5", "int6", "int7",
];
const ROLES: &[&str] = &["lan", "wan", "internal", "external", "inbound", "outbound"];
const PROTOCOLS: &[u8] = &[6, 17];
const QUERIES: &[&str] = &[
    "example.com",
    "google.com",
    "amazon.com",
    "elastic.co",
    "apple.com",
    "facebook.com",
    "microsoft.com",
];
const QUERY_TYPES: &[&str] = &["A", "AAAA"];
const SERVERS: &[&str] = &[
    "srv0", "srv1", "srv2", "srv3", "srv4", "srv5", "srv6", "srv7",
];
const ACTIONS: &[&str] = &["deny", "accept"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRecord {
    pub template: usize,
    pub date: DateTime<Utc>,
    pub user: &'static str,
    pub server: &'static str,
    pub src_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_ip: Ipv4Addr,
    pub dst_port: u16,
    pub policy_id: u32,
    pub session_id: u32,
    pub src_interface: &'static str,
    pub dst_interface: &'static str,
    pub src_role: &'static str,
    pub dst_role: &'static str,
    pub protocol: u8,
    pub query_name: &'static str,
    pub query_type: &'static str,
    pub xid: u32,
    pub level: &'static str,
    pub action: &'static str,
    pub sent_packets: u32,
    pub duration: u32,
    pub received_packets: u32,
}

impl Default for FirewallRecord {
    fn default() -> Self {
        Self {
            template: 0,
            date: DateTime::default(),
            user: USERS[0],
            server: SERVERS[0],
            src_ip: Ipv4Addr::UNSPECIFIED,
            src_port: 0,
            dst_ip: Ipv4Addr::UNSPECIFIED,
            dst_port: 0,
            policy_id: 0,
            session_id: 0,
            src_interface: INTERFACES[0],
            dst_interface: INTERFACES[0],
            src_role: ROLES[0],
            dst_role: ROLES[0],
            protocol: PROTOCOLS[0],
            query_name: QUERIES[0],
            query_type: QUERY_TYPES[0],
            xid: 0,
            level: LEVELS[0],
            action: ACTIONS[0],
            sent_packets: 0,
            duration: 0,
            received_packets: 0,
        }
    }
}

impl Fields for FirewallRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "date" => self.date.format("%Y-%m-%d").to_string(),
            "time" => self.date.format("%H:%M:%S").to_string(),
            "eventtime" => self.date.timestamp().to_string(),
            "devname" => return Some(Cow::Borrowed(DEVICE_NAME)),
            "devid" => return Some(Cow::Borrowed(DEVICE_ID)),
            "logid" => return Some(Cow::Borrowed(LOG_ID)),
            "vd" => return Some(Cow::Borrowed(VDOM)),
            "tz" => return Some(Cow::Borrowed(TIME_ZONE)),
            "user" => return Some(Cow::Borrowed(self.user)),
            "server" => return Some(Cow::Borrowed(self.server)),
            "srcintf" => return Some(Cow::Borrowed(self.src_interface)),
            "dstintf" => return Some(Cow::Borrowed(self.dst_interface)),
            "srcintfrole" => return Some(Cow::Borrowed(self.src_role)),
            "dstintfrole" => return Some(Cow::Borrowed(self.dst_role)),
            "qname" => return Some(Cow::Borrowed(self.query_name)),
            "qtype" => return Some(Cow::Borrowed(self.query_type)),
            "level" => return Some(Cow::Borrowed(self.level)),
            "action" => return Some(Cow::Borrowed(self.action)),
            "srcip" => self.src_ip.to_string(),
            "srcport" => self.src_port.to_string(),
            "dstip" => self.dst_ip.to_string(),
            "dstport" => self.dst_port.to_string(),
            "policyid" => self.policy_id.to_string(),
            "sessionid" => self.session_id.to_string(),
            "proto" => self.protocol.to_string(),
            "xid" => self.xid.to_string(),
            "duration" => self.duration.to_string(),
            "sentpkt" => self.sent_packets.to_string(),
            "sentbyte" => (u64::from(self.sent_packets) * PACKET_SIZE).to_string(),
            "rcvdbyte" => (u64::from(self.received_packets) * PACKET_SIZE).to_string(),
            _ => return None,
        };
        Some(Cow::Owned(value))
    }
}

/// Fortinet firewall generator.
pub struct Firewall<R: Rng = StdRng> {
    templates: Vec<Template>,
    record: FirewallRecord,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> Firewall<R> {
    pub fn new(rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let record = FirewallRecord::default();
        let templates = TEMPLATES
            .iter()
            .map(|body| -> Result<Template, TemplateError> {
                let template = Template::parse(&format!("{HEADER}{body}"))?;
                template.verify(&record)?;
                Ok(template)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(GeneratorError::Template)?;

        let mut firewall = Self {
            templates,
            record,
            clock,
            rng,
        };
        firewall.randomize();
        Ok(firewall)
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let record = &mut self.record;

        record.template = rng.gen_range(0..self.templates.len());
        record.date = self.clock.now();
        record.user = *pick(rng, USERS);
        record.server = *pick(rng, SERVERS);
        record.src_ip = network::ipv4(rng);
        record.src_port = network::port(rng);
        record.dst_ip = network::ipv4(rng);
        record.dst_port = network::port(rng);
        record.policy_id = rng.gen_range(0..256);
        record.session_id = rng.gen_range(0..65536);
        record.src_interface = *pick(rng, INTERFACES);
        record.dst_interface = *pick(rng, INTERFACES);
        record.src_role = *pick(rng, ROLES);
        record.dst_role = *pick(rng, ROLES);
        record.protocol = *pick(rng, PROTOCOLS);
        record.query_name = *pick(rng, QUERIES);
        record.query_type = *pick(rng, QUERY_TYPES);
        record.xid = rng.gen_range(0..256);
        record.level = *pick(rng, LEVELS);
        record.action = *pick(rng, ACTIONS);
        record.sent_packets = rng.gen_range(0..65536);
        record.duration = rng.gen_range(0..1024);
        record.received_packets = rng.gen_range(0..65536);
    }
}

impl<R: Rng + Send> Generator for Firewall<R> {
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError> {
        let rendered = self.templates[self.record.template]
            .render(&self.record)
            .map_err(GeneratorError::Render)?;
        self.randomize();
        Ok(rendered.into_bytes())
    }
}

pub fn construct(
    _config: &serde_yaml::Value,
    ctx: BuildContext,
) -> Result<Box<dyn Generator>, GeneratorError> {
    Ok(Box::new(Firewall::new(ctx.rng, ctx.clock)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(1970, 1, 2, 3, 4, 5).unwrap())
    }

    fn render_with(template: usize) -> (FirewallRecord, String) {
        let mut firewall = Firewall::new(StdRng::seed_from_u64(1), fixed_clock()).unwrap();
        firewall.record.template = template;
        let record = firewall.record.clone();
        let line = String::from_utf8(firewall.next_record().unwrap()).unwrap();
        (record, line)
    }

    #[test]
    fn test_header_is_fixed() {
        for template in 0..4 {
            let (_, line) = render_with(template);
            assert!(line.starts_with(
                r#"date=1970-01-02 time=03:04:05 devname="testswitch3" devid="testrouter" logid="0123456789" "#
            ));
        }
    }

    #[test]
    fn test_user_event() {
        let (record, line) = render_with(0);
        assert!(line.contains(r#"type="event" subtype="user""#));
        assert!(line.contains("eventtime=97445 tz=\"-0500\""));
        assert!(line.ends_with(&format!(
            r#"msg="FSSO-logon event from FSSO_{}: user {} logged on {}""#,
            record.server, record.user, record.src_ip
        )));
    }

    #[test]
    fn test_dns_query() {
        let (record, line) = render_with(2);
        assert!(line.contains(&format!("srcport={} ", record.src_port)));
        assert!(line.contains("dstport=53 "));
        assert!(line.contains(&format!(r#"qname="{}""#, record.query_name)));
        assert!(line.ends_with(r#"qtypeval=1 qclass="IN""#));
    }

    #[test]
    fn test_traffic_counters() {
        let (record, line) = render_with(3);
        let sent = u64::from(record.sent_packets) * PACKET_SIZE;
        let received = u64::from(record.received_packets) * PACKET_SIZE;
        assert!(line.contains(&format!("sentbyte={sent} rcvdbyte={received} ")));
        assert!(line.contains(&format!("sentpkt={} ", record.sent_packets)));
        assert!(record.duration < 1024);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut first = Firewall::new(StdRng::seed_from_u64(5), fixed_clock()).unwrap();
        let mut second = Firewall::new(StdRng::seed_from_u64(5), fixed_clock()).unwrap();
        for _ in 0..20 {
            assert_eq!(first.next_record().unwrap(), second.next_record().unwrap());
        }
    }
}
