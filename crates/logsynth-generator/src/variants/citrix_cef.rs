//! Citrix NetScaler application firewall events in CEF, behind a syslog
//! style prefix.
//!
//! ```yaml
//! generator:
//!   type: citrix:cef
//! ```
//!
//! There are no options. The `geolocation=` and `cs6=` extensions are only
//! present when the drawn value is non-empty.

use std::borrow::Cow;
use std::net::Ipv4Addr;

use chrono::{DateTime, Datelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use crate::generator::{BuildContext, Clock, Generator, GeneratorError};
use crate::template::{Fields, Template};
use crate::values::{network, pick, text};

pub const NAME: &str = "citrix:cef";

const TEMPLATE: &str = "{timestamp} <{facility}.{priority}> {addr} CEF:{cef_version}|Citrix|NetScalar|{version}|APPFW|{violation}|{severity}|src={src_addr} {?geo}geolocation={geo} {/geo}spt={src_port} method={method} request={request} msg={message} cn1={event_id} cn2={tx_id} cs1=pr_ffc cs2={ppe_id} cs3={session_id} cs4={severity_label} cs5={year} {?category}cs6={category} {/category}act={action}";

const TIME_LAYOUTS: &[&str] = &["%b %d %H:%M:%S", "%b %-d %H:%M:%S"];

const FACILITIES: &[&str] = &[
    "auth", "authpriv", "cron", "daemon", "kern", "lpr", "mail", "mark", "news", "syslog", "user",
    "uucp", "local0", "local1", "local2", "local3", "local4", "local5", "local6", "local7",
];

const PRIORITIES: &[&str] = &[
    "debug", "info", "notice", "warning", "warn", "err", "error", "crit", "alert", "emerg",
    "panic",
];

const VERSIONS: &[&str] = &["NS10.0", "NS11.0"];

const VIOLATIONS: &[&str] = &[
    "APPFW_FIELDCONSISTENCY",
    "APPFW_SAFECOMMERCE",
    "APPFW_SAFECOMMERCE_XFORM",
    "APPFW_SIGNATURE_MATCH",
    "APPFW_STARTURL",
];

const LOCATIONS: &[&str] = &[
    "",
    "Unknown",
    "NorthAmerica.US.Arizona.Tucson.*.*",
    "NorthAmerica.US.Arizona.Phoenix.*.*",
    "NorthAmerica.US.California.SanFrancisco.*.*",
];

const METHODS: &[&str] = &["GET", "POST"];

const REQUESTS: &[&str] = &[
    "http://aaron.stratum8.net/FFC/login.html",
    "http://aaron.stratum8.net/FFC/login.php?login_name=abc&passwd=123456789234&drinking_pref=on&text_area=&loginButton=ClickToLogin&as_sfid=AAAAAAWIahZuYoIFbjBhYMP05mJLTwEfIY0a7AKGMg3jIBaKmwtK4t7M7lNxOgj7Gmd3SZc8KUj6CR6a7W5kIWDRHN8PtK1Zc-txHkHNx1WknuG9DzTuM7t1THhluevXu9I4kp8%3D&as_fid=feeec8758b41740eedeeb6b35b85dfd3d5def30c",
    "http://aaron.stratum8.net/FFC/wwwboard/passwd.txt",
    "http://aaron.stratum8.net/FFC/CreditCardMind.html",
    "http://vpx247.example.net/FFC/CreditCardMind.html",
    r"http://vpx247.example.net/FFC/login_post.html?abc\=def",
    "http://vpx247.example.net/FFC/wwwboard/passwd.txt",
];

const MESSAGES: &[&str] = &[
    "Signature violation rule ID 807: web-cgi /wwwboard/passwd.txt access",
    "Disallow Illegal URL.",
    "Transformed (xout) potential credit card numbers seen in server response",
    "Maximum number of potential credit card numbers seen",
    "Field consistency check failed for field passwd",
];

const SEVERITY_LABELS: &[&str] = &["INFO", "ALERT"];

const CATEGORIES: &[&str] = &["", "web-cgi", "sql-injection", "phishing"];

const ACTIONS: &[&str] = &["blocked", "not blocked", "transformed"];

/// One application firewall event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitrixRecord {
    pub timestamp: DateTime<Utc>,
    pub time_layout: &'static str,
    pub facility: &'static str,
    pub priority: &'static str,
    pub addr: Ipv4Addr,
    pub cef_version: u32,
    pub version: &'static str,
    pub violation: &'static str,
    pub severity: u32,
    pub src_addr: Ipv4Addr,
    pub geo: &'static str,
    pub src_port: u16,
    pub method: &'static str,
    pub request: &'static str,
    pub message: &'static str,
    pub event_id: u32,
    pub tx_id: u32,
    pub ppe_id: u32,
    pub session_id: String,
    pub severity_label: &'static str,
    pub category: &'static str,
    pub action: &'static str,
}

impl Default for CitrixRecord {
    fn default() -> Self {
        Self {
            timestamp: DateTime::default(),
            time_layout: TIME_LAYOUTS[0],
            facility: FACILITIES[0],
            priority: PRIORITIES[0],
            addr: Ipv4Addr::UNSPECIFIED,
            cef_version: 0,
            version: VERSIONS[0],
            violation: VIOLATIONS[0],
            severity: 1,
            src_addr: Ipv4Addr::UNSPECIFIED,
            geo: "",
            src_port: 0,
            method: METHODS[0],
            request: REQUESTS[0],
            message: MESSAGES[0],
            event_id: 0,
            tx_id: 0,
            ppe_id: 1,
            session_id: String::new(),
            severity_label: SEVERITY_LABELS[0],
            category: "",
            action: ACTIONS[0],
        }
    }
}

impl Fields for CitrixRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let borrowed: &str = match name {
            "facility" => self.facility,
            "priority" => self.priority,
            "version" => self.version,
            "violation" => self.violation,
            "geo" => self.geo,
            "method" => self.method,
            "request" => self.request,
            "message" => self.message,
            "session_id" => self.session_id.as_str(),
            "severity_label" => self.severity_label,
            "category" => self.category,
            "action" => self.action,
            "timestamp" => {
                return Some(Cow::Owned(
                    self.timestamp.format(self.time_layout).to_string(),
                ))
            }
            "addr" => return Some(Cow::Owned(self.addr.to_string())),
            "cef_version" => return Some(Cow::Owned(self.cef_version.to_string())),
            "severity" => return Some(Cow::Owned(self.severity.to_string())),
            "src_addr" => return Some(Cow::Owned(self.src_addr.to_string())),
            "src_port" => return Some(Cow::Owned(self.src_port.to_string())),
            "event_id" => return Some(Cow::Owned(self.event_id.to_string())),
            "tx_id" => return Some(Cow::Owned(self.tx_id.to_string())),
            "ppe_id" => return Some(Cow::Owned(format!("PPE{}", self.ppe_id))),
            "year" => return Some(Cow::Owned(self.timestamp.year().to_string())),
            _ => return None,
        };
        Some(Cow::Borrowed(borrowed))
    }
}

/// Citrix application firewall generator.
pub struct CitrixCef<R: Rng = StdRng> {
    template: Template,
    record: CitrixRecord,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> CitrixCef<R> {
    pub fn new(rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let template = Template::parse(TEMPLATE).map_err(GeneratorError::Template)?;
        let record = CitrixRecord::default();
        template.verify(&record).map_err(GeneratorError::Template)?;

        let mut citrix = Self {
            template,
            record,
            clock,
            rng,
        };
        citrix.randomize();
        Ok(citrix)
    }

    pub fn record(&self) -> &CitrixRecord {
        &self.record
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let record = &mut self.record;

        record.timestamp = self.clock.now();
        record.time_layout = *pick(rng, TIME_LAYOUTS);
        record.facility = *pick(rng, FACILITIES);
        record.priority = *pick(rng, PRIORITIES);
        record.addr = network::ipv4(rng);
        record.cef_version = rng.gen_range(0..2);
        record.version = *pick(rng, VERSIONS);
        record.violation = *pick(rng, VIOLATIONS);
        record.severity = rng.gen_range(1..=10);
        record.src_addr = network::ipv4(rng);
        record.geo = *pick(rng, LOCATIONS);
        record.src_port = network::port(rng);
        record.method = *pick(rng, METHODS);
        record.request = *pick(rng, REQUESTS);
        record.message = *pick(rng, MESSAGES);
        record.event_id = rng.gen_range(0..1000);
        record.tx_id = rng.gen_range(0..100_000);
        record.ppe_id = rng.gen_range(1..=9);
        record.session_id = text::hash_hex(rng, 16);
        record.severity_label = *pick(rng, SEVERITY_LABELS);
        record.category = *pick(rng, CATEGORIES);
        record.action = *pick(rng, ACTIONS);
    }
}

impl<R: Rng + Send> Generator for CitrixCef<R> {
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
    Ok(Box::new(CitrixCef::new(ctx.rng, ctx.clock)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(1970, 1, 2, 3, 4, 5).unwrap())
    }

    fn render(record: CitrixRecord) -> String {
        Template::parse(TEMPLATE).unwrap().render(&record).unwrap()
    }

    #[test]
    fn test_optional_sections_render_only_when_set() {
        let record = CitrixRecord {
            timestamp: Utc.with_ymd_and_hms(1970, 1, 2, 3, 4, 5).unwrap(),
            time_layout: TIME_LAYOUTS[1],
            session_id: "00".repeat(16),
            ..CitrixRecord::default()
        };
        let bare = render(record.clone());
        assert!(bare.starts_with("Jan 2 03:04:05 <auth.debug> 0.0.0.0 CEF:0|Citrix|NetScalar|NS10.0|APPFW|"));
        assert!(bare.contains("src=0.0.0.0 spt=0 "));
        assert!(bare.contains("cs5=1970 act=blocked"));
        assert!(!bare.contains("geolocation="));
        assert!(!bare.contains("cs6="));

        let full = render(CitrixRecord {
            geo: LOCATIONS[1],
            category: CATEGORIES[3],
            ..record
        });
        assert!(full.contains("src=0.0.0.0 geolocation=Unknown spt=0 "));
        assert!(full.contains("cs5=1970 cs6=phishing act=blocked"));
    }

    #[test]
    fn test_field_ranges() {
        let mut citrix = CitrixCef::new(StdRng::seed_from_u64(4), fixed_clock()).unwrap();
        for _ in 0..200 {
            let record = citrix.record().clone();
            assert!(record.cef_version < 2);
            assert!((1..=10).contains(&record.severity));
            assert!((1..=9).contains(&record.ppe_id));
            assert!(record.event_id < 1000);
            assert!(record.tx_id < 100_000);
            assert_eq!(record.session_id.len(), 32);

            let line = String::from_utf8(citrix.next_record().unwrap()).unwrap();
            assert!(line.contains(&format!(" cs3={} ", record.session_id)));
            assert!(line.ends_with(&format!("act={}", record.action)));
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut first = CitrixCef::new(StdRng::seed_from_u64(2), fixed_clock()).unwrap();
        let mut second = CitrixCef::new(StdRng::seed_from_u64(2), fixed_clock()).unwrap();
        for _ in 0..20 {
            assert_eq!(first.next_record().unwrap(), second.next_record().unwrap());
        }
    }
}
