//! `dashprobe` verifies network reachability to the dashboard login endpoint,
//! optionally through an HTTP/HTTPS forward proxy picked up from
//! environment-style configuration.
//!
//! # Quick Start
//!
//! ```no_run
//! use dashprobe::{EnvConfig, LOGIN_URL, ProbeOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let selection = dashprobe::resolve(&EnvConfig);
//!     let outcome = dashprobe::run(LOGIN_URL, &selection, &ProbeOptions::default())?;
//!
//!     dashprobe::write_report(&outcome, &mut std::io::stdout())?;
//!     std::process::exit(outcome.exit_code)
//! }
//! ```
//!
//! The probe performs exactly one POST and terminates; it is not a general
//! HTTP client and never retries.

mod config;
mod error;
mod probe;
mod proxy;

pub use crate::config::{ConfigSource, EnvConfig, StaticConfig};
pub use crate::error::{ProbeError, TransportErrorKind};
pub use crate::probe::{LOGIN_URL, ProbeOptions, RequestOutcome, run, write_report};
pub use crate::proxy::{
    CANDIDATE_PROTOCOLS, ProxyCredentials, ProxySelection, ResolvedProxy, resolve,
};

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests;
