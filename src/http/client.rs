//! HTTP client setup and middleware configuration.
//!
//! The client built here is a regular `reqwest` client behind a middleware
//! stack:
//!
//! - **Tracing**: request/response spans via `reqwest-tracing`
//! - **Retry Logic**: exponential backoff for transient failures
//! - **Progress**: every response body reports into a [`ProgressRegistry`]
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::dispatch;
//! use fetchmeter::http::{create_http_client, HttpClientConfig};
//! use fetchmeter::progress::ProgressRegistry;
//! use reqwest::header::{HeaderMap, USER_AGENT};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (dispatcher, _main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(USER_AGENT, "fetchmeter/0.1".parse()?);
//!
//! let config = HttpClientConfig {
//!     retries: 5,
//!     proxy: None,
//!     headers: Some(headers),
//! };
//! let client = create_http_client(config, registry)?;
//! # Ok(())
//! # }
//! ```

use super::middleware::ProgressMiddleware;
use crate::progress::ProgressRegistry;

use reqwest::{header::HeaderMap, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::sync::Arc;

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Number of retries for failed requests.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            proxy: None,
            headers: None,
        }
    }
}

/// Creates an HTTP client whose response bodies report into `registry`.
///
/// Retries only cover sending the request and receiving its head; a body
/// transfer that fails midway is not restarted.
pub fn create_http_client(
    config: HttpClientConfig,
    registry: Arc<ProgressRegistry>,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.retries);

    let mut inner_client_builder = reqwest::Client::builder();

    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    if let Some(headers) = config.headers {
        inner_client_builder = inner_client_builder.default_headers(headers);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        // Retry failed requests.
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        // Innermost: wrap the body of whichever attempt succeeded.
        .with(ProgressMiddleware::new(registry))
        .build();

    Ok(client)
}
