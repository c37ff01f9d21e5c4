//! Attribute catalog for dependency-aware records.
//!
//! A catalog maps short attribute keys (abbreviations) to descriptors. A
//! descriptor may name a prerequisite that must accompany it in any record,
//! and may lack a value producer, in which case it is a label-only
//! placeholder that never renders on its own.
//!
//! All structural checks run once in [`Catalog::new`]. Lookups after that
//! point treat any inconsistency as a programmer error.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::values::{ValueContext, ValueProducer};

/// One catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDescriptor {
    /// Short key rendered into records
    pub abbrev: String,
    /// Long-form field name, informational only
    pub target: String,
    /// Attribute that must be present whenever this one is
    pub prerequisite: Option<String>,
    /// Value source; `None` for label-only placeholders
    pub producer: Option<ValueProducer>,
}

impl AttributeDescriptor {
    /// A label-only descriptor with no prerequisite.
    pub fn new(abbrev: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            abbrev: abbrev.into(),
            target: target.into(),
            prerequisite: None,
            producer: None,
        }
    }

    pub fn requires(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisite = Some(prerequisite.into());
        self
    }

    pub fn producing(mut self, producer: ValueProducer) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Render as `abbrev=value`, or `None` for label-only descriptors.
    pub fn render<R: Rng>(&self, ctx: &ValueContext<'_>, rng: &mut R) -> Option<String> {
        let producer = self.producer.as_ref()?;
        let value = producer.produce(ctx, rng);
        Some(format!("{}={}", self.abbrev, escape_value(&value)))
    }
}

/// Escape an extension value: backslash and equals sign are the only
/// characters with meaning inside an extension value.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '=' => escaped.push_str("\\="),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Structural defects detected while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("abbreviation '{0}' appears more than once")]
    DuplicateAbbreviation(String),

    #[error("'{abbrev}' requires '{prerequisite}', which is not in the catalog")]
    DanglingPrerequisite {
        abbrev: String,
        prerequisite: String,
    },

    #[error("label '{0}' has no prerequisite to label")]
    LabelWithoutPrerequisite(String),

    #[error("prerequisite cycle including '{0}'")]
    Cycle(String),
}

/// Immutable, validated attribute catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<String, AttributeDescriptor>,
    /// Sorted keys of every descriptor that has a value producer
    selectable: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate keys, labels without a
    /// prerequisite, dangling prerequisites, and prerequisite cycles.
    pub fn new(
        descriptors: impl IntoIterator<Item = AttributeDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut entries = HashMap::new();
        for descriptor in descriptors {
            if descriptor.abbrev.ends_with("Label") && descriptor.prerequisite.is_none() {
                return Err(CatalogError::LabelWithoutPrerequisite(descriptor.abbrev));
            }
            if entries.contains_key(&descriptor.abbrev) {
                return Err(CatalogError::DuplicateAbbreviation(descriptor.abbrev));
            }
            entries.insert(descriptor.abbrev.clone(), descriptor);
        }

        for descriptor in entries.values() {
            if let Some(prerequisite) = &descriptor.prerequisite {
                if !entries.contains_key(prerequisite) {
                    return Err(CatalogError::DanglingPrerequisite {
                        abbrev: descriptor.abbrev.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        for start in entries.keys() {
            let mut seen = HashSet::new();
            let mut next = Some(start.as_str());
            while let Some(key) = next {
                if !seen.insert(key) {
                    return Err(CatalogError::Cycle(key.to_string()));
                }
                next = entries[key].prerequisite.as_deref();
            }
        }

        let mut selectable: Vec<String> = entries
            .values()
            .filter(|d| d.producer.is_some())
            .map(|d| d.abbrev.clone())
            .collect();
        selectable.sort();

        Ok(Self {
            entries,
            selectable,
        })
    }

    pub fn get(&self, abbrev: &str) -> Option<&AttributeDescriptor> {
        self.entries.get(abbrev)
    }

    pub fn contains(&self, abbrev: &str) -> bool {
        self.entries.contains_key(abbrev)
    }

    /// Sorted keys of every descriptor the resolver may pick at random.
    pub fn selectable(&self) -> &[String] {
        &self.selectable
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The prerequisite chain of `abbrev`, starting with `abbrev` itself and
    /// ending with the descriptor that has no prerequisite.
    ///
    /// # Panics
    ///
    /// Panics if `abbrev` is unknown or the chain revisits a key. Neither can
    /// happen for a catalog that passed [`Catalog::new`].
    pub fn chain(&self, abbrev: &str) -> Vec<&AttributeDescriptor> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(abbrev);
        while let Some(key) = next {
            let Some(descriptor) = self.entries.get(key) else {
                panic!("attribute '{key}' is not in the catalog");
            };
            if !seen.insert(key) {
                panic!("prerequisite cycle including '{key}'");
            }
            chain.push(descriptor);
            next = descriptor.prerequisite.as_deref();
        }
        chain
    }
}
