//! Dependency-aware attribute selection.
//!
//! Given a [`Catalog`] and per-record [`Constraints`], the resolver picks a
//! subset of attributes such that:
//!
//! - no excluded key appears, not even when pulled in as a prerequisite
//! - every included key appears together with its prerequisite chain
//! - no key appears twice
//! - random additions stop once a target drawn from `[0, max)` is reached
//!
//! Selection order is hidden from callers: the rendered list is shuffled.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{AttributeDescriptor, Catalog};
use crate::values::ValueContext;

/// Per-record selection constraints.
#[derive(Debug, Clone, Copy)]
pub struct Constraints<'a> {
    /// Upper bound on randomly added attributes
    pub max: usize,
    /// Keys that must appear with their prerequisite chains
    pub must_include: &'a [String],
    /// Keys that must never appear; takes precedence over `must_include`
    pub must_exclude: &'a [String],
}

/// Attribute resolver over a validated catalog.
pub struct Resolver<'c> {
    catalog: &'c Catalog,
}

impl<'c> Resolver<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Choose the descriptors for one record, in selection order.
    ///
    /// Prerequisites come before the attributes that need them. Included
    /// chains are added whole regardless of `max`; a random chain longer
    /// than the remaining budget keeps only its members nearest the terminal
    /// prerequisite.
    pub fn select<R: Rng>(
        &self,
        constraints: &Constraints<'_>,
        rng: &mut R,
    ) -> Vec<&'c AttributeDescriptor> {
        let mut have: HashSet<&str> = constraints
            .must_exclude
            .iter()
            .map(String::as_str)
            .collect();
        let mut picked = Vec::new();

        for abbrev in constraints.must_include {
            self.append_chain(abbrev, None, &mut have, &mut picked);
        }

        if constraints.max == 0 {
            return picked;
        }

        let mut order: Vec<&str> = self
            .catalog
            .selectable()
            .iter()
            .map(String::as_str)
            .collect();
        order.shuffle(rng);
        let target = rng.gen_range(0..constraints.max);

        for abbrev in order {
            if picked.len() >= target {
                break;
            }
            if have.contains(abbrev) {
                continue;
            }
            let budget = constraints.max.saturating_sub(picked.len());
            self.append_chain(abbrev, Some(budget), &mut have, &mut picked);
        }

        picked
    }

    /// Select, render, and shuffle the attributes for one record.
    ///
    /// Label-only descriptors render to nothing and are dropped.
    pub fn resolve<R: Rng>(
        &self,
        constraints: &Constraints<'_>,
        ctx: &ValueContext<'_>,
        rng: &mut R,
    ) -> Vec<String> {
        let selected = self.select(constraints, rng);
        let mut rendered: Vec<String> = selected
            .into_iter()
            .filter_map(|descriptor| descriptor.render(ctx, rng))
            .collect();
        rendered.shuffle(rng);
        rendered
    }

    fn append_chain<'h>(
        &self,
        abbrev: &str,
        budget: Option<usize>,
        have: &mut HashSet<&'h str>,
        picked: &mut Vec<&'c AttributeDescriptor>,
    ) where
        'c: 'h,
    {
        let mut chain = self.catalog.chain(abbrev);
        if let Some(budget) = budget {
            if chain.len() > budget {
                chain.drain(..chain.len() - budget);
            }
        }

        for descriptor in chain.into_iter().rev() {
            if have.insert(descriptor.abbrev.as_str()) {
                picked.push(descriptor);
            }
        }
    }
}
