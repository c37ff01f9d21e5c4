//! Name to constructor dispatch for generator variants.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;

use crate::generator::{BuildContext, Clock, Generator, GeneratorError};
use crate::variants::{asa, aws_firewall, cef, citrix_cef, clf, fortinet, vpcflow, winlog};

/// Builds a generator from its configuration section.
pub type Constructor =
    fn(&serde_yaml::Value, BuildContext) -> Result<Box<dyn Generator>, GeneratorError>;

/// The set of known generator types.
#[derive(Default)]
pub struct Registry {
    constructors: BTreeMap<String, Constructor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in variant.
    pub fn builtin() -> Result<Self, GeneratorError> {
        let mut registry = Self::new();
        registry.register(asa::NAME, asa::construct)?;
        registry.register(aws_firewall::NAME, aws_firewall::construct)?;
        registry.register(cef::NAME, cef::construct)?;
        registry.register(citrix_cef::NAME, citrix_cef::construct)?;
        registry.register(clf::NAME, clf::construct)?;
        registry.register(fortinet::NAME, fortinet::construct)?;
        registry.register(vpcflow::NAME, vpcflow::construct)?;
        registry.register(winlog::NAME, winlog::construct)?;
        Ok(registry)
    }

    /// Bind `name` to `constructor`. A name can only be bound once.
    pub fn register(&mut self, name: &str, constructor: Constructor) -> Result<(), GeneratorError> {
        if self.constructors.contains_key(name) {
            return Err(GeneratorError::DuplicateName(name.to_string()));
        }
        self.constructors.insert(name.to_string(), constructor);
        Ok(())
    }

    /// Look up the constructor bound to `name`.
    pub fn resolve(&self, name: &str) -> Result<Constructor, GeneratorError> {
        self.constructors
            .get(name)
            .copied()
            .ok_or_else(|| GeneratorError::UnknownType {
                name: name.to_string(),
                valid: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Construct the generator described by `config`.
    ///
    /// `config` must carry a `type` naming a registered variant. An optional
    /// `static_time` (RFC 3339) pins every rendered timestamp to that instant.
    pub fn build(
        &self,
        config: &serde_yaml::Value,
        rng: StdRng,
    ) -> Result<Box<dyn Generator>, GeneratorError> {
        let name = match config.get("type").and_then(serde_yaml::Value::as_str) {
            Some(name) if !name.is_empty() => name,
            _ => return Err(GeneratorError::MissingField("type")),
        };
        let constructor = self.resolve(name)?;

        let clock = match config.get("static_time") {
            None | Some(serde_yaml::Value::Null) => Clock::System,
            Some(value) => Clock::Fixed(parse_static_time(value)?),
        };

        constructor(config, BuildContext { rng, clock })
    }
}

fn parse_static_time(value: &serde_yaml::Value) -> Result<DateTime<Utc>, GeneratorError> {
    let invalid = || GeneratorError::InvalidValue {
        field: "static_time",
        value: serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
        expected: "an RFC 3339 timestamp".to_string(),
    };
    let text = value.as_str().ok_or_else(invalid)?;
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn yaml(source: &str) -> serde_yaml::Value {
        serde_yaml::from_str(source).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1)
    }

    #[test]
    fn test_register_twice_is_duplicate() {
        let mut registry = Registry::new();
        registry.register("x", vpcflow::construct).unwrap();
        let err = registry.register("x", clf::construct).unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateName(ref name) if name == "x"));
        assert_eq!(err.to_string(), "generator type 'x' is already registered");
    }

    #[test]
    fn test_resolve_missing_is_unknown_type() {
        let registry = Registry::builtin().unwrap();
        let err = registry.resolve("missing").err().unwrap();
        assert_eq!(
            err.to_string(),
            "unknown generator type 'missing', valid values are {aws:firewall, aws:vpcflow, cisco:asa, citrix:cef, clf, fortinet:firewall, generic:cef, winlog}"
        );
    }

    #[test]
    fn test_builtin_names_sorted() {
        let registry = Registry::builtin().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names.len(), 8);
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_build_requires_type() {
        let registry = Registry::builtin().unwrap();
        for source in ["combined: true", "type: ''", "type: 7"] {
            let err = registry.build(&yaml(source), rng()).err().unwrap();
            assert_eq!(err.to_string(), "missing required field 'type'");
        }
    }

    #[test]
    fn test_build_dispatches_to_variant() {
        let registry = Registry::builtin().unwrap();
        let mut generator = registry
            .build(&yaml("type: clf\ncombined: true"), rng())
            .unwrap();
        let line = String::from_utf8(generator.next_record().unwrap()).unwrap();
        assert!(line.ends_with('"'));
    }

    #[test]
    fn test_variant_errors_pass_through() {
        let registry = Registry::builtin().unwrap();
        let err = registry
            .build(&yaml("type: winlog\nevent_id: 1"), rng())
            .err()
            .unwrap();
        assert!(err.to_string().starts_with("'1' is not a valid value for 'event_id'"));
    }

    #[test]
    fn test_static_time_pins_clock() {
        let registry = Registry::builtin().unwrap();
        let config = yaml("type: aws:vpcflow\nstatic_time: '2024-01-02T03:04:05Z'");
        let mut generator = registry.build(&config, rng()).unwrap();
        let line = String::from_utf8(generator.next_record().unwrap()).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap().timestamp();
        assert_eq!(line.split(' ').nth(11).unwrap(), end.to_string());
    }

    #[test]
    fn test_static_time_must_be_rfc3339() {
        let registry = Registry::builtin().unwrap();
        let config = yaml("type: aws:vpcflow\nstatic_time: yesterday");
        let err = registry.build(&config, rng()).err().unwrap();
        assert_eq!(
            err.to_string(),
            "'yesterday' is not a valid value for 'static_time' expected an RFC 3339 timestamp"
        );
    }

    #[test]
    fn test_same_seed_same_records() {
        let registry = Registry::builtin().unwrap();
        for name in registry.names() {
            let config = match name {
                "generic:cef" => yaml(
                    "type: generic:cef\nstatic_time: '2024-01-02T03:04:05Z'\nvendors: [v]\nproducts: [p]\nversions: ['1']\nclasses: [c]\nnames: [n]\nmax_extensions: 10",
                ),
                other => yaml(&format!("type: '{other}'\nstatic_time: '2024-01-02T03:04:05Z'")),
            };
            let mut first = registry.build(&config, rng()).unwrap();
            let mut second = registry.build(&config, rng()).unwrap();
            for _ in 0..5 {
                assert_eq!(
                    first.next_record().unwrap(),
                    second.next_record().unwrap(),
                    "{name} is not deterministic"
                );
            }
        }
    }
}
