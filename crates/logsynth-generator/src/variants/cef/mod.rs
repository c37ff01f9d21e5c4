//! Generic Common Event Format records with resolver-selected extensions.
//!
//! ```yaml
//! generator:
//!   type: generic:cef
//!   max_extensions: 20
//!   vendors: ["VaporCorp"]
//!   products: ["VaporWare"]
//!   versions: ["0.1", "0.1-alpha"]
//!   classes: ["APPSS"]
//!   names: ["APPSS_UL", "APPSS_LTUL"]
//!   must_include: ["src", "spt", "dst", "dpt"]
//!   must_exclude: ["art"]
//! ```
//!
//! The header fields are drawn from the configured lists; the extensions
//! are chosen by the [`Resolver`] over the built-in [`CATALOG`]. State is
//! randomized at construction, and each record is rendered before the next
//! randomization.

pub mod extensions;

use std::borrow::Cow;

use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;

use crate::generator::{parse_config, BuildContext, Clock, Generator, GeneratorError};
use crate::resolver::{Constraints, Resolver};
use crate::template::{Fields, Template};
use crate::values::{pick, Pools, ValueContext};

pub use extensions::CATALOG;

pub const NAME: &str = "generic:cef";

const TEMPLATE: &str =
    "CEF:{cef_version}|{vendor}|{product}|{version}|{class}|{name}|{severity}|{extensions}";

/// Configuration for [`Cef`]. Empty pools fall back to the built-in ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CefConfig {
    pub cef: Vec<u32>,
    pub vendors: Vec<String>,
    pub products: Vec<String>,
    pub versions: Vec<String>,
    pub classes: Vec<String>,
    pub names: Vec<String>,
    pub severities: Vec<u32>,

    pub users: Vec<String>,
    pub privs: Vec<String>,
    pub methods: Vec<String>,
    pub interfaces: Vec<String>,
    pub timezones: Vec<String>,
    pub actions: Vec<String>,
    pub messages: Vec<String>,
    pub words: Vec<String>,
    pub text: String,

    pub must_include: Vec<String>,
    pub must_exclude: Vec<String>,
    pub max_extensions: usize,

    /// Render every UUID extension as the zeroed v4 value
    pub zero_uuid: bool,
}

impl CefConfig {
    /// Check required lists and extension keys, then fill in defaults.
    pub fn validate(mut self) -> Result<Self, GeneratorError> {
        let required = [
            ("vendors", &self.vendors),
            ("products", &self.products),
            ("versions", &self.versions),
            ("classes", &self.classes),
            ("names", &self.names),
        ];
        if let Some((field, _)) = required.iter().find(|(_, list)| list.is_empty()) {
            return Err(GeneratorError::MissingField(*field));
        }

        for (field, keys) in [
            ("must_include", &self.must_include),
            ("must_exclude", &self.must_exclude),
        ] {
            if let Some(unknown) = keys.iter().find(|key| !CATALOG.contains(key)) {
                return Err(GeneratorError::InvalidValue {
                    field,
                    value: unknown.clone(),
                    expected: "a CEF extension key".to_string(),
                });
            }
        }

        if self.cef.is_empty() {
            self.cef = vec![0];
        }
        if self.severities.is_empty() {
            self.severities = (1..=10).collect();
        }
        Ok(self)
    }

    fn pools(&self) -> Pools {
        fn or_default(configured: &[String], default: Vec<String>) -> Vec<String> {
            if configured.is_empty() {
                default
            } else {
                configured.to_vec()
            }
        }

        let defaults = Pools::default();
        Pools {
            words: or_default(&self.words, defaults.words),
            users: or_default(&self.users, defaults.users),
            privileges: or_default(&self.privs, defaults.privileges),
            methods: or_default(&self.methods, defaults.methods),
            interfaces: or_default(&self.interfaces, defaults.interfaces),
            time_zones: or_default(&self.timezones, defaults.time_zones),
            actions: or_default(&self.actions, defaults.actions),
            messages: or_default(&self.messages, defaults.messages),
            text: if self.text.is_empty() {
                defaults.text
            } else {
                self.text.clone()
            },
        }
    }
}

/// Current header and extension values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CefRecord {
    pub cef_version: u32,
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub class: String,
    pub name: String,
    pub severity: u32,
    pub extensions: Vec<String>,
}

impl Fields for CefRecord {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "cef_version" => Cow::Owned(self.cef_version.to_string()),
            "vendor" => Cow::Borrowed(self.vendor.as_str()),
            "product" => Cow::Borrowed(self.product.as_str()),
            "version" => Cow::Borrowed(self.version.as_str()),
            "class" => Cow::Borrowed(self.class.as_str()),
            "name" => Cow::Borrowed(self.name.as_str()),
            "severity" => Cow::Owned(self.severity.to_string()),
            "extensions" => Cow::Owned(self.extensions.join(" ")),
            _ => return None,
        };
        Some(value)
    }
}

/// Generic CEF generator.
pub struct Cef<R: Rng = StdRng> {
    config: CefConfig,
    pools: Pools,
    template: Template,
    record: CefRecord,
    clock: Clock,
    rng: R,
}

impl<R: Rng + Send> Cef<R> {
    pub fn new(config: CefConfig, rng: R, clock: Clock) -> Result<Self, GeneratorError> {
        let config = config.validate()?;
        let template = Template::parse(TEMPLATE).map_err(GeneratorError::Template)?;
        let record = CefRecord::default();
        template.verify(&record).map_err(GeneratorError::Template)?;

        let mut cef = Self {
            pools: config.pools(),
            config,
            template,
            record,
            clock,
            rng,
        };
        cef.randomize();
        Ok(cef)
    }

    /// The state the next record will be rendered from.
    pub fn record(&self) -> &CefRecord {
        &self.record
    }

    fn randomize(&mut self) {
        let rng = &mut self.rng;
        let config = &self.config;

        self.record.cef_version = *pick(rng, &config.cef);
        self.record.vendor = pick(rng, &config.vendors).clone();
        self.record.product = pick(rng, &config.products).clone();
        self.record.version = pick(rng, &config.versions).clone();
        self.record.class = pick(rng, &config.classes).clone();
        self.record.name = pick(rng, &config.names).clone();
        self.record.severity = *pick(rng, &config.severities);

        let constraints = Constraints {
            max: config.max_extensions,
            must_include: &config.must_include,
            must_exclude: &config.must_exclude,
        };
        let ctx = ValueContext {
            pools: &self.pools,
            now: self.clock.now(),
            zero_uuid: config.zero_uuid,
        };
        self.record.extensions = Resolver::new(&CATALOG).resolve(&constraints, &ctx, rng);
    }
}

impl<R: Rng + Send> Generator for Cef<R> {
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
    config: &serde_yaml::Value,
    ctx: BuildContext,
) -> Result<Box<dyn Generator>, GeneratorError> {
    let config: CefConfig = parse_config(config)?;
    Ok(Box::new(Cef::new(config, ctx.rng, ctx.clock)?))
}
