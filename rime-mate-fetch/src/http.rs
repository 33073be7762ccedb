//! HTTP client helper with native-tls support.

use std::time::Duration;
use ureq::Agent;
use ureq::tls::{RootCerts, TlsConfig, TlsProvider};

/// Timeout for establishing the connection to a source. Reading the body
/// has no limit unless the caller asks for one: the model file is large and
/// mirrors can be slow.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent header sent with every request.
pub const USER_AGENT: &str = concat!("rime-mate/", env!("CARGO_PKG_VERSION"));

/// Validate that a source URL can be fetched.
///
/// Only `http` and `https` URLs with a host are accepted. Returns an error
/// string describing why the URL was rejected.
pub fn validate_source_url(url: &str) -> Result<(), String> {
    let parsed = url::Url::parse(url).map_err(|e| format!("Invalid URL '{}': {}", url, e))?;

    match parsed.scheme() {
        "https" | "http" => {}
        scheme => {
            return Err(format!(
                "Unsupported URL scheme '{}'; only HTTP(S) downloads are allowed. URL: {}",
                scheme, url
            ));
        }
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(format!("URL has no host: {}", url));
    }

    Ok(())
}

/// Create a new HTTP agent configured with native-tls. `overall` bounds a
/// whole request including the body; `None` leaves it unbounded.
pub fn agent(overall: Option<Duration>) -> Agent {
    let tls_config = TlsConfig::builder()
        .provider(TlsProvider::NativeTls)
        .root_certs(RootCerts::PlatformVerifier)
        .build();

    Agent::config_builder()
        .tls_config(tls_config)
        .timeout_connect(Some(CONNECT_TIMEOUT))
        .timeout_global(overall)
        .build()
        .into()
}
