use percent_encoding::percent_decode_str;
use tracing::{debug, warn};
use url::Url;

use crate::config::ConfigSource;

/// Candidate schemes whose proxy settings are checked, in priority order.
pub const CANDIDATE_PROTOCOLS: [&str; 2] = ["https", "http"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedProxy {
    Direct,
    HttpProxy { host: String, port: u16 },
}

/// Result of proxy resolution.
///
/// Credentials travel here as an explicit value instead of being registered
/// in process-global state; they answer only proxy authentication challenges.
/// They may be present even when the selection is [`ResolvedProxy::Direct`],
/// because a protocol can carry a username/password pair without a host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxySelection {
    pub proxy: ResolvedProxy,
    pub credentials: Option<ProxyCredentials>,
}

/// Scans the candidate protocols and selects the first with a non-empty
/// `<protocol>.proxyHost`. Username/password capture happens in the same
/// iteration and is last-pair-wins across the iterations that actually run,
/// so a pair from a hostless protocol still takes effect.
///
/// When no per-protocol key names a host, the conventional
/// `<protocol>_proxy` URL variables are consulted as a fallback.
pub fn resolve(config: &dyn ConfigSource) -> ProxySelection {
    let mut credentials = None;
    let mut port = 0_u16;

    for protocol in CANDIDATE_PROTOCOLS {
        let host = config.get(&format!("{protocol}.proxyHost"));
        port = parse_port_or_keep_previous(
            config.get(&format!("{protocol}.proxyPort")).as_deref(),
            port,
        );

        let username = config
            .get(&format!("{protocol}.proxyUser"))
            .or_else(|| config.get(&format!("{protocol}.proxyUserName")));
        let password = config.get(&format!("{protocol}.proxyPassword"));
        if let (Some(username), Some(password)) = (username, password) {
            credentials = Some(ProxyCredentials { username, password });
        }

        if let Some(host) = host
            && !host.is_empty()
        {
            debug!(protocol, host = %host, port, "selected forward proxy");
            return ProxySelection {
                proxy: ResolvedProxy::HttpProxy { host, port },
                credentials,
            };
        }
    }

    if let Some((proxy, url_credentials)) = proxy_from_url_variable(config) {
        return ProxySelection {
            proxy,
            credentials: credentials.or(url_credentials),
        };
    }

    debug!("no proxy configured, connecting directly");
    ProxySelection {
        proxy: ResolvedProxy::Direct,
        credentials,
    }
}

/// Lenient port parsing: malformed or absent text keeps the carried-over
/// value rather than resetting it (starting value 0 before any iteration).
pub(crate) fn parse_port_or_keep_previous(text: Option<&str>, previous: u16) -> u16 {
    let Some(text) = text else {
        return previous;
    };
    text.trim().parse::<u16>().unwrap_or(previous)
}

/// Fallback detection from `https_proxy`/`http_proxy` style URL variables,
/// checked in the same priority order as the per-protocol keys.
fn proxy_from_url_variable(
    config: &dyn ConfigSource,
) -> Option<(ResolvedProxy, Option<ProxyCredentials>)> {
    for protocol in CANDIDATE_PROTOCOLS {
        let key = format!("{protocol}_proxy");
        let Some(text) = config.get(&key) else {
            continue;
        };
        let url = match Url::parse(&text) {
            Ok(url) => url,
            Err(error) => {
                warn!(key, %error, "ignoring malformed proxy url");
                continue;
            }
        };
        let Some(host) = url.host_str() else {
            continue;
        };

        let port = url.port_or_known_default().unwrap_or(0);
        let credentials = match (url.username(), url.password()) {
            ("", _) | (_, None) => None,
            (username, Some(password)) => Some(ProxyCredentials {
                username: decode_userinfo(username),
                password: decode_userinfo(password),
            }),
        };
        debug!(key, host, port, "selected forward proxy from url variable");
        return Some((
            ResolvedProxy::HttpProxy {
                host: host.to_owned(),
                port,
            },
            credentials,
        ));
    }
    None
}

fn decode_userinfo(text: &str) -> String {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| text.to_owned())
}
