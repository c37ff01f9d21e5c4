//! Seeded synthetic log record generators for logsynth.
//!
//! Every generator owns its own random stream, so a fixed seed and
//! configuration reproduce the same byte-identical records on every run.
//!
//! # Architecture
//!
//! ```text
//! generator config (YAML)
//!        │  type, static_time
//!        ▼
//! ┌─────────────────┐
//! │    Registry     │  name → constructor
//! └────────┬────────┘
//!          │ BuildContext { rng, clock }
//!          ▼
//! ┌─────────────────┐      ┌──────────┐      ┌─────────┐
//! │ variant (state) │─────▶│ Resolver │─────▶│ Catalog │   generic:cef only
//! └────────┬────────┘      └──────────┘      └─────────┘
//!          │ Template::render
//!          ▼
//!    Vec<u8> (one record)
//! ```
//!
//! # Example
//!
//! ```rust
//! use logsynth_generator::{derive_rng, Registry};
//!
//! let registry = Registry::builtin().unwrap();
//! let config: serde_yaml::Value = serde_yaml::from_str(
//!     "type: aws:vpcflow\nstatic_time: '2024-01-02T03:04:05Z'",
//! )
//! .unwrap();
//!
//! let mut generator = registry.build(&config, derive_rng(42, 0)).unwrap();
//! let record = generator.next_record().unwrap();
//! assert!(record.starts_with(b"2 123456789010 "));
//! ```
//!
//! # Variants
//!
//! - `aws:firewall` - AWS Network Firewall JSON documents
//! - `aws:vpcflow` - AWS VPC flow log lines
//! - `cisco:asa` - Cisco ASA firewall messages
//! - `citrix:cef` - Citrix NetScaler application firewall CEF events
//! - `clf` - Apache common/combined access log lines
//! - `fortinet:firewall` - FortiGate key=value logs
//! - `generic:cef` - ArcSight CEF events with resolver-chosen extensions
//! - `winlog` - Windows Security event XML

pub mod catalog;
pub mod generator;
pub mod registry;
pub mod resolver;
pub mod template;
pub mod values;
pub mod variants;

// Re-exports for convenience
pub use generator::{derive_rng, derive_seed, BuildContext, Clock, Generator, GeneratorError};
pub use registry::{Constructor, Registry};
