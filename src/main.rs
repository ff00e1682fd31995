use std::io;
use std::process;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use dashprobe::{EnvConfig, LOGIN_URL, ProbeOptions};

/// Exit code for transport-level failures, kept distinct from the policy
/// exit code 1 used for unexpected HTTP statuses so callers can tell the
/// two channels apart.
const EXIT_TRANSPORT_FAILURE: i32 = 2;

fn main() {
    // stdout carries only the probe report; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(io::stderr)
        .init();

    let selection = dashprobe::resolve(&EnvConfig);
    debug!(
        proxy = ?selection.proxy,
        has_credentials = selection.credentials.is_some(),
        "proxy resolution complete"
    );

    let outcome = match dashprobe::run(LOGIN_URL, &selection, &ProbeOptions::default()) {
        Ok(outcome) => outcome,
        Err(probe_error) => {
            error!(error = %probe_error, "login probe failed");
            process::exit(EXIT_TRANSPORT_FAILURE);
        }
    };

    if let Err(write_error) = dashprobe::write_report(&outcome, &mut io::stdout()) {
        error!(error = %write_error, "failed to write probe report");
        process::exit(EXIT_TRANSPORT_FAILURE);
    }
    process::exit(outcome.exit_code);
}
