//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Create an HTTP client with the standard docrag configuration.
///
/// Config: 10s connect timeout, `request_timeout` per request, rustls TLS,
/// `docrag/{version}` user-agent, redirect limit 10. Falls back to a default
/// client if the builder rejects the configuration.
#[must_use]
pub(crate) fn client_with_timeout(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(request_timeout)
        .user_agent(concat!("docrag/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .unwrap_or_default()
}
