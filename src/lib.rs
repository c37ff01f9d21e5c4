//! logsynth
//!
//! Generates synthetic log records (VPC flow logs, firewall logs, CEF
//! events, access logs, Windows events) and writes them to files, syslog
//! or S3 for exercising ingest pipelines.
//!
//! A run is described by a YAML [`config::Config`]: a list of runners, each
//! pairing one generator with one output. Every runner owns a random stream
//! derived from the master seed, so a run with a fixed seed and fixed
//! timestamps reproduces the same bytes.
//!
//! # CLI Usage
//!
//! ```bash
//! # Run every runner in a configuration file
//! logsynth run -c logsynth.yml --seed 42
//!
//! # Print five Cisco ASA records
//! logsynth generate --type cisco:asa --count 5
//!
//! # Show the available generator types
//! logsynth list
//! ```

pub mod config;
pub mod runner;

pub use config::{Config, ConfigError, RunnerConfig};
pub use runner::{build_runners, run_all, RunMetrics, Runner};
