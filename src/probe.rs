use std::io::{Read, Write};
use std::time::Duration;

use http::Method;
use http::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::ProbeResult;
use crate::error::{ProbeError, classify_ureq_transport_error};
use crate::proxy::{ProxyCredentials, ProxySelection, ResolvedProxy};

/// The fixed authentication endpoint this probe targets.
pub const LOGIN_URL: &str = "https://dashboard.appcelerator.com/api/v1/auth/login";

/// Throwaway demo credentials; the server is expected to reject them with a
/// 400, which still proves the endpoint is reachable.
pub(crate) const LOGIN_PARAMS: [(&str, &str); 3] = [
    ("username", "random@appcelerator.com"),
    ("password", "password"),
    ("from", "studio"),
];

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10_000);
const MAX_RESPONSE_BODY_BYTES: usize = 1024 * 1024;
const CLIENT_NAME: &str = "dashprobe";

#[derive(Clone, Debug)]
pub struct ProbeOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Classification of the single HTTP response, created once and never
/// mutated. Statuses 200 and 400 both map to exit code 0: a 400 is a known
/// client-side rejection of the demo credentials, not a transport problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOutcome {
    pub http_status: u16,
    pub body: String,
    pub exit_code: i32,
}

impl RequestOutcome {
    pub(crate) fn new(http_status: u16, body: String) -> Self {
        let exit_code = if http_status == 200 || http_status == 400 {
            0
        } else {
            1
        };
        Self {
            http_status,
            body,
            exit_code,
        }
    }
}

/// Performs the single POST against `target`, routed through the resolved
/// proxy. Transport failures are fatal; HTTP statuses never are.
pub fn run(
    target: &str,
    selection: &ProxySelection,
    options: &ProbeOptions,
) -> ProbeResult<RequestOutcome> {
    let agent = make_agent(selection)?;
    let body = login_form_body()?;

    let request = ureq::http::Request::builder()
        .method(Method::POST)
        .uri(target)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.into_bytes())
        .map_err(|source| ProbeError::RequestBuild { source })?;

    let configured_request = agent
        .configure_request(request)
        .timeout_connect(Some(options.connect_timeout))
        .timeout_recv_response(Some(options.read_timeout))
        .timeout_recv_body(Some(options.read_timeout))
        .build();

    debug!(uri = target, "sending login probe");
    let mut response = agent
        .run(configured_request)
        .map_err(|source| match source {
            ureq::Error::Timeout(_) => ProbeError::Timeout {
                timeout_ms: options.read_timeout.as_millis(),
                uri: target.to_owned(),
            },
            other => ProbeError::Transport {
                kind: classify_ureq_transport_error(&other),
                uri: target.to_owned(),
                source: Box::new(other),
            },
        })?;

    let status = response.status().as_u16();
    let body = read_body_limited(&mut response, MAX_RESPONSE_BODY_BYTES)?;
    debug!(status, body_bytes = body.len(), "login probe answered");
    Ok(RequestOutcome::new(status, body))
}

/// Prints the status line followed by every body line, in order.
pub fn write_report(outcome: &RequestOutcome, writer: &mut dyn Write) -> std::io::Result<()> {
    writeln!(writer, "HTTP Response code: {}", outcome.http_status)?;
    for line in outcome.body.lines() {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

pub(crate) fn login_form_body() -> ProbeResult<String> {
    serde_urlencoded::to_string(LOGIN_PARAMS).map_err(|source| ProbeError::SerializeForm { source })
}

fn make_agent(selection: &ProxySelection) -> ProbeResult<ureq::Agent> {
    let proxy = match &selection.proxy {
        ResolvedProxy::Direct => None,
        ResolvedProxy::HttpProxy { host, port } => {
            // HTTP-type proxy regardless of the target scheme: ureq opens a
            // CONNECT tunnel through it for every proxied request.
            let url = proxy_url(host, *port, selection.credentials.as_ref())?;
            Some(
                ureq::Proxy::new(url.as_str()).map_err(|_| ProbeError::InvalidProxyAddress {
                    address: format!("{host}:{port}"),
                })?,
            )
        }
    };

    let config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .user_agent(CLIENT_NAME)
        .proxy(proxy)
        .build();
    Ok(config.new_agent())
}

/// Builds `http://[user:pass@]host:port`, percent-encoding the userinfo.
pub(crate) fn proxy_url(
    host: &str,
    port: u16,
    credentials: Option<&ProxyCredentials>,
) -> ProbeResult<Url> {
    let invalid = || ProbeError::InvalidProxyAddress {
        address: format!("{host}:{port}"),
    };

    let mut url = Url::parse(&format!("http://{host}:{port}")).map_err(|_| invalid())?;
    if let Some(credentials) = credentials {
        url.set_username(&credentials.username)
            .map_err(|()| invalid())?;
        url.set_password(Some(&credentials.password))
            .map_err(|()| invalid())?;
    }
    Ok(url)
}

fn read_body_limited(
    response: &mut ureq::http::Response<ureq::Body>,
    max_bytes: usize,
) -> ProbeResult<String> {
    let mut reader = response.body_mut().as_reader();
    let mut collected = Vec::new();
    let mut chunk = [0_u8; 8192];

    loop {
        let read = reader
            .read(&mut chunk)
            .map_err(|source| ProbeError::ReadBody { source })?;
        if read == 0 {
            break;
        }
        let remaining = max_bytes.saturating_sub(collected.len());
        if read >= remaining {
            collected.extend_from_slice(&chunk[..remaining]);
            break;
        }
        collected.extend_from_slice(&chunk[..read]);
    }

    Ok(String::from_utf8_lossy(&collected).into_owned())
}
