// # HTTP Reachability Probe
//
// This crate answers "is the internet reachable?" by issuing HTTP requests.
//
// ## Behaviour
//
// URLs are tried in order. The first response with a success or redirect
// status means online. If every request fails (connection error, timeout,
// client/server error status), the internet is considered unreachable.
//
// A failing request is never an error from the probe's point of view: the
// probe answers `Ok(false)` so detection can carry on with an offline state.

use netstatus_core::traits::ReachabilityProbe;
use netstatus_core::{Error, Result};

use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 3;

/// Default endpoints, all of which answer with a tiny body or an empty 204
pub const DEFAULT_PROBE_URLS: &[&str] = &[
    "http://connectivitycheck.gstatic.com/generate_204",
    "http://captive.apple.com/hotspot-detect.html",
    "http://www.msftconnecttest.com/connecttest.txt",
];

/// HTTP-based reachability probe
pub struct HttpReachabilityProbe {
    /// URLs to try, in order
    urls: Vec<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpReachabilityProbe {
    /// Create a new HTTP probe
    ///
    /// # Parameters
    ///
    /// - `urls`: Endpoints to try, in order (must not be empty)
    /// - `timeout`: Upper bound for a single request
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `urls` is empty or the HTTP client
    /// cannot be built.
    pub fn new(urls: Vec<String>, timeout: Duration) -> Result<Self> {
        if urls.is_empty() {
            return Err(Error::config("HTTP probe needs at least one URL"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { urls, client })
    }

    /// Create a probe over [`DEFAULT_PROBE_URLS`]
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            DEFAULT_PROBE_URLS.iter().map(|url| url.to_string()).collect(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Whether a single endpoint answers
    async fn check(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("Probe {} answered {}", url, status);
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for HttpReachabilityProbe {
    async fn is_online(&self) -> Result<bool> {
        for url in &self.urls {
            if self.check(url).await {
                return Ok(true);
            }
        }

        warn!("None of {} probe URL(s) answered", self.urls.len());
        Ok(false)
    }

    fn probe_name(&self) -> &'static str {
        "http"
    }
}
