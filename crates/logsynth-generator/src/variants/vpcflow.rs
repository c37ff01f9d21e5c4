//! AWS VPC flow log records, version 2.
//!
//! ```yaml
//! generator:
//!   type: aws:vpcflow
//! ```
//!
//! There are no options. State is randomized at construction; each record
//! is rendered before the next randomization.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use rand::rngs::StdRng;
use rand::Rng;

use crate::generator::{BuildContext, Clock, Generator, GeneratorError};
use crate::template::{Fields, Template};
use crate::values::{network, pick};

pub const NAME: &str = "aws:vpcflow";

const TEMPLATE: &str = "2 123456789010 eni-1235b8ca123456789 {src_addr} {dst_addr} {src_port} {dst_port} {protocol} {packets} {bytes} {start} {end} {action} {log_status}";

const ACTIONS: &[&str] = &["ACCEPT", "REJECT"];
const STATUSES: &[&str] = &["OK", "SKIPDATA"];

/// One flow record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRecord {
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: u8,
    pub packets: u32,
    pub bytes: u64,
    pub start: i64,
    pub end: i64,
    pub action: &'static str,
    pub log_status: &'static str,
}

impl Default for FlowRecord {
    fn default() -> Self {
        Self {
            src_addr: Ipv4Addr::UNSPECIFIED,
            dst_addr: Ipv4Addr::UNSPECIFIED,
            src_port: 0,
            dst_port: 0,
            protocol: 0,
            packets: 0,
            bytes: 0,
            start: 0,
            end: 0,
            action: ACTIONS[0],
            log_status: "NODATA",
        }
    }
}

impl Fields for FlowRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "src_addr" => self.src_addr.to_string(),
            "dst_addr" => self.dst_addr.to_string(),
            "src_port" => self.src_port.to_string(),
            "dst_port" => self.dst_port.to_string(),
            "protocol" => self.protocol.to_string(),
            "packets" => self.packets.to_string(),
            "bytes" => self.bytes.to_string(),
            "start" => self.start.to_string(),
            "end" => self.end.to_string(),
            "action" => return Some(Cow::Borrowed(self.action)),
            "log_status" => return Some(Cow::Borrowed(self.log_status)),
            _ => return None,
        };
        Some(Cow::Owned(value))
    }
}

/// VPC flow log generator.
pub struct VpcFlow<R: Rng = StdRng> {
    template: Template,
    record: FlowRecord,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> VpcFlow<R> {
    pub fn new(rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let template = Template::parse(TEMPLATE).map_err(GeneratorError::Template)?;
        let record = FlowRecord::default();
        template.verify(&record).map_err(GeneratorError::Template)?;

        let mut flow = Self {
            template,
            record,
            clock,
            rng,
        };
        flow.randomize();
        Ok(flow)
    }

    /// The state the next record will be rendered from.
    pub fn record(&self) -> &FlowRecord {
        &self.record
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let record = &mut self.record;

        record.src_addr = network::ipv4(rng);
        record.dst_addr = network::ipv4(rng);
        record.src_port = network::port(rng);
        record.dst_port = network::port(rng);
        record.protocol = rng.gen();
        record.packets = rng.gen_range(0..1 << 20);
        record.bytes = u64::from(record.packets) * 1500;
        record.end = self.clock.now().timestamp();
        record.start = record.end - rng.gen_range(0..60i64);
        record.action = *pick(rng, ACTIONS);
        record.log_status = if record.packets == 0 {
            "NODATA"
        } else {
            *pick(rng, STATUSES)
        };
    }
}

impl<R: Rng + Send> Generator for VpcFlow<R> {
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError> {
        let rendered = self
            .template
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
    Ok(Box::new(VpcFlow::new(ctx.rng, ctx.clock)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(2014, 12, 14, 4, 6, 50).unwrap())
    }

    #[test]
    fn test_golden_record_seed_one() {
        let mut flow = VpcFlow::new(StdRng::seed_from_u64(1), fixed_clock()).unwrap();
        let record = String::from_utf8(flow.next_record().unwrap()).unwrap();
        assert_eq!(record, GOLDEN_SEED_ONE);
    }

    #[test]
    fn test_field_invariants() {
        let mut flow = VpcFlow::new(StdRng::seed_from_u64(42), fixed_clock()).unwrap();
        let end = fixed_clock().now().timestamp();

        for _ in 0..100 {
            let record = flow.record().clone();
            assert!(record.packets < 1 << 20);
            assert_eq!(record.bytes, u64::from(record.packets) * 1500);
            assert_eq!(record.end, end);
            assert!((end - 59..=end).contains(&record.start));
            assert!(ACTIONS.contains(&record.action));
            if record.packets == 0 {
                assert_eq!(record.log_status, "NODATA");
            } else {
                assert!(STATUSES.contains(&record.log_status));
            }

            let line = String::from_utf8(flow.next_record().unwrap()).unwrap();
            let fields: Vec<&str> = line.split(' ').collect();
            assert_eq!(fields.len(), 14);
            assert_eq!(fields[3], record.src_addr.to_string());
            assert_eq!(fields[13], record.log_status);
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut first = VpcFlow::new(StdRng::seed_from_u64(9), fixed_clock()).unwrap();
        let mut second = VpcFlow::new(StdRng::seed_from_u64(9), fixed_clock()).unwrap();
        for _ in 0..20 {
            assert_eq!(first.next_record().unwrap(), second.next_record().unwrap());
        }
    }

    const GOLDEN_SEED_ONE: &str = "2 123456789010 eni-1235b8ca123456789 97.24.48.211 100.26.104.249 26954 53541 218 448764 673146000 1418530000 1418530010 REJECT SKIPDATA";
}
