//! The record generator contract shared by every log format.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;

use crate::template::TemplateError;

/// Error type for generator construction and record production.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The configured `type` is not registered
    #[error("unknown generator type '{name}', valid values are {{{valid}}}")]
    UnknownType { name: String, valid: String },

    /// A type name was registered twice
    #[error("generator type '{0}' is already registered")]
    DuplicateName(String),

    /// A required configuration field is absent or empty
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A configuration field holds a value outside its allowed set
    #[error("'{value}' is not a valid value for '{field}' expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: String,
    },

    /// The configuration could not be deserialized
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A template failed to parse or does not match its record
    #[error("template error: {0}")]
    Template(#[source] TemplateError),

    /// Substitution failed while producing a record
    #[error("render error: {0}")]
    Render(#[source] TemplateError),

    /// A structured record could not be encoded
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Serialize(err.to_string())
    }
}

impl From<quick_xml::Error> for GeneratorError {
    fn from(err: quick_xml::Error) -> Self {
        GeneratorError::Serialize(err.to_string())
    }
}

/// A stream of synthetic log records.
///
/// Every call to [`Generator::next_record`] returns one complete record and
/// advances the internal state so the following call yields a different one.
pub trait Generator: Send {
    /// Produce the next record.
    fn next_record(&mut self) -> Result<Vec<u8>, GeneratorError>;
}

/// Source of "now" for rendered timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock
    #[default]
    System,
    /// Every timestamp renders as this instant
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

/// Everything a variant constructor receives besides its configuration.
pub struct BuildContext {
    /// Random stream owned by the constructed generator
    pub rng: StdRng,
    /// Time source for rendered timestamps
    pub clock: Clock,
}

impl BuildContext {
    /// Create a context with a stream seeded from `seed` and the wall clock.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            clock: Clock::System,
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Compute the seed of stream `index` under `master_seed`.
///
/// Streams derived from the same master seed are independent of each other
/// and of scheduling order.
pub fn derive_seed(master_seed: u64, index: u64) -> u64 {
    master_seed.wrapping_add(index.wrapping_mul(0x9E3779B97F4A7C15))
}

/// Create the random stream for runner `index`.
pub fn derive_rng(master_seed: u64, index: u64) -> StdRng {
    StdRng::seed_from_u64(derive_seed(master_seed, index))
}

/// Deserialize a variant configuration from its raw YAML section.
pub(crate) fn parse_config<T: DeserializeOwned>(
    config: &serde_yaml::Value,
) -> Result<T, GeneratorError> {
    Ok(serde_yaml::from_value(config.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::Rng;

    #[test]
    fn test_derive_seed_index_zero_is_master() {
        assert_eq!(derive_seed(42, 0), 42);
        assert_ne!(derive_seed(42, 1), derive_seed(42, 2));
    }

    #[test]
    fn test_derived_streams_are_deterministic() {
        let mut first = derive_rng(7, 3);
        let mut second = derive_rng(7, 3);
        let a: Vec<u64> = (0..8).map(|_| first.gen()).collect();
        let b: Vec<u64> = (0..8).map(|_| second.gen()).collect();
        assert_eq!(a, b);

        let mut other = derive_rng(7, 4);
        let c: Vec<u64> = (0..8).map(|_| other.gen()).collect();
        assert_ne!(a, c);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Clock::Fixed(instant).now(), instant);
        assert_eq!(Clock::default(), Clock::System);
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = GeneratorError::InvalidValue {
            field: "event_type",
            value: "Audit".to_string(),
            expected: "'alert, netflow'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'Audit' is not a valid value for 'event_type' expected 'alert, netflow'"
        );

        let err = GeneratorError::UnknownType {
            name: "bob".to_string(),
            valid: "clf, winlog".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown generator type 'bob', valid values are {clf, winlog}"
        );
    }
}
