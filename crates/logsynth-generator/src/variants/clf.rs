//! Apache access log lines in Common or Combined Log Format.
//!
//! ```yaml
//! generator:
//!   type: clf
//!   combined: true
//! ```
//!
//! State is randomized immediately before each record is rendered.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;

use crate::generator::{parse_config, BuildContext, Clock, Generator, GeneratorError};
use crate::template::{Fields, Template};
use crate::values::{http, network};

pub const NAME: &str = "clf";

const COMMON: &str = "{host} - - {date} {request} {status} {bytes}";
const COMBINED: &str = r#"{host} - - {date} {request} {status} {bytes} - "{user_agent}""#;

const DATE_FORMAT: &str = "[%d/%b/%Y:%H:%M:%S %z]";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClfConfig {
    /// Append the referer and user agent columns
    pub combined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    pub host: Ipv4Addr,
    pub timestamp: DateTime<Utc>,
    pub method: &'static str,
    pub page: u32,
    pub version: &'static str,
    pub status: u16,
    pub bytes: u32,
    pub user_agent: &'static str,
}

impl Default for AccessRecord {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED,
            timestamp: DateTime::default(),
            method: http::METHODS[0],
            page: 0,
            version: http::VERSIONS[0],
            status: http::STATUSES[0],
            bytes: 0,
            user_agent: http::USER_AGENTS[0],
        }
    }
}

impl AccessRecord {
    fn request(&self) -> String {
        format!(
            "\"{} /random-{}.html {}\"",
            self.method, self.page, self.version
        )
    }
}

impl Fields for AccessRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "host" => self.host.to_string(),
            "date" => self.timestamp.format(DATE_FORMAT).to_string(),
            "request" => self.request(),
            "status" => self.status.to_string(),
            "bytes" => self.bytes.to_string(),
            "user_agent" => return Some(Cow::Borrowed(self.user_agent)),
            _ => return None,
        };
        Some(Cow::Owned(value))
    }
}

/// Web access log generator.
pub struct Clf<R: Rng = StdRng> {
    template: Template,
    record: AccessRecord,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> Clf<R> {
    pub fn new(config: ClfConfig, rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let source = if config.combined { COMBINED } else { COMMON };
        let template = Template::parse(source).map_err(GeneratorError::Template)?;
        let record = AccessRecord::default();
        template.verify(&record).map_err(GeneratorError::Template)?;

        Ok(Self {
            template,
            record,
            clock,
            rng,
        })
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let record = &mut self.record;

        record.host = network::ipv4(rng);
        record.method = http::method(rng);
        record.page = rng.gen_range(0..100);
        record.version = http::version(rng);
        record.status = http::status(rng);
        record.bytes = rng.gen_range(0..10_000);
        record.user_agent = http::user_agent(rng);
        record.timestamp = self.clock.now();
    }
}

impl<R: Rng + Send> Generator for Clf<R> {
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError> {
        self.randomize();
        let rendered = self
            .template
            .render(&self.record)
            .map_err(GeneratorError::Render)?;
        Ok(rendered.into_bytes())
    }
}

pub fn construct(
    config: &serde_yaml::Value,
    ctx: BuildContext,
) -> Result<Box<dyn Generator>, GeneratorError> {
    let config: ClfConfig = parse_config(config)?;
    Ok(Box::new(Clf::new(config, ctx.rng, ctx.clock)?))
}
