//! One module per log format. Each exposes `NAME`, its configuration type,
//! the generator itself and a `construct` function for the registry.

pub mod asa;
pub mod aws_firewall;
pub mod cef;
pub mod citrix_cef;
pub mod clf;
pub mod fortinet;
pub mod vpcflow;
pub mod winlog;
