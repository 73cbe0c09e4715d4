//! Core loader implementation.
//!
//! A [`Loader`] performs the whole "show progress while fetching" flow:
//! register a listener for the URL, fetch it through the instrumented client,
//! consume the body chunk by chunk and forget the listener once the load is
//! over, whether it succeeded, failed or was cancelled.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fetchmeter::dispatch;
//! use fetchmeter::loader::LoaderBuilder;
//! use fetchmeter::progress::{CallbackListener, ProgressRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), fetchmeter::Error> {
//! let (dispatcher, main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//! tokio::spawn(main_loop.run());
//!
//! let loader = LoaderBuilder::new(registry).build()?;
//! let image = loader
//!     .load(
//!         "https://example.com/photo.jpg",
//!         Arc::new(CallbackListener::new(1.0, |read, total| {
//!             if let Some(total) = total.filter(|t| *t > 0) {
//!                 println!("{}%", 100 * read / total);
//!             }
//!         })),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

use super::config::LoaderConfig;
use super::summary::{Status, Summary};
use crate::error::{Error, Result};
use crate::http::{create_http_client, HttpClientConfig};
use crate::progress::{ProgressListener, ProgressRegistry, RequestKey};

use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A URL to load, optionally tracked by a listener.
#[derive(Clone)]
pub struct LoadRequest {
    /// URL of the resource.
    pub url: Url,
    /// Listener notified while the body is read.
    pub listener: Option<Arc<dyn ProgressListener>>,
}

impl LoadRequest {
    /// Create an untracked request for `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            listener: None,
        }
    }

    /// Track the request with `listener`.
    pub fn with_listener(self, listener: Arc<dyn ProgressListener>) -> Self {
        Self {
            listener: Some(listener),
            ..self
        }
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("url", &self.url.as_str())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl TryFrom<&str> for LoadRequest {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        parse_url(value).map(LoadRequest::new)
    }
}

/// Parse an absolute HTTP(S) URL.
fn parse_url(value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "The url \"{}\" uses unsupported scheme \"{}\"",
            value, scheme
        ))),
    }
}

/// Keeps a listener registered for as long as it lives.
struct Expectation<'a> {
    registry: &'a ProgressRegistry,
    key: RequestKey,
}

impl<'a> Expectation<'a> {
    fn new(
        registry: &'a ProgressRegistry,
        key: RequestKey,
        listener: Arc<dyn ProgressListener>,
    ) -> Self {
        registry.expect(&key, listener);
        Self { registry, key }
    }
}

impl Drop for Expectation<'_> {
    fn drop(&mut self) {
        self.registry.forget(&self.key);
    }
}

/// Fetches resources while reporting their progress.
#[derive(Clone)]
pub struct Loader {
    config: LoaderConfig,
    client: ClientWithMiddleware,
    registry: Arc<ProgressRegistry>,
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

impl Loader {
    /// Creates a new Loader with the given configuration.
    pub(crate) fn new(config: LoaderConfig, registry: Arc<ProgressRegistry>) -> Result<Self> {
        let client = create_http_client(
            HttpClientConfig {
                retries: config.retries,
                proxy: config.proxy.clone(),
                headers: config.headers.clone(),
            },
            registry.clone(),
        )?;
        Ok(Self {
            config,
            client,
            registry,
        })
    }

    /// Gets the registry progress is reported into.
    pub fn registry(&self) -> &Arc<ProgressRegistry> {
        &self.registry
    }

    /// Gets the instrumented client.
    pub fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }

    /// Gets the number of retries per request.
    pub fn retries(&self) -> u32 {
        self.config.retries
    }

    /// Gets the number of concurrent loads.
    pub fn concurrent_loads(&self) -> usize {
        self.config.concurrent_loads
    }

    /// Load `url`, reporting its progress to `listener`.
    ///
    /// The listener is forgotten when the load ends, successfully or not.
    pub async fn load(&self, url: &str, listener: Arc<dyn ProgressListener>) -> Result<Bytes> {
        let url = parse_url(url)?;
        let _expectation = Expectation::new(&self.registry, RequestKey::from(&url), listener);
        self.fetch(&url).await
    }

    /// Load every request, at most `concurrent_loads` at a time.
    ///
    /// Requests sharing a URL share a key, so the last listener registered
    /// for it wins.
    pub async fn load_all(&self, requests: &[LoadRequest]) -> Vec<Summary> {
        stream::iter(requests)
            .map(|request| self.load_one(request))
            .buffer_unordered(self.config.concurrent_loads.max(1))
            .collect::<Vec<_>>()
            .await
    }

    async fn load_one(&self, request: &LoadRequest) -> Summary {
        let key = RequestKey::from(&request.url);
        let _expectation = request
            .listener
            .clone()
            .map(|listener| Expectation::new(&self.registry, key.clone(), listener));

        let summary = match self.fetch(&request.url).await {
            Ok(body) => Summary::new(key)
                .with_size(body.len() as u64)
                .with_status(Status::Success),
            Err(e) => Summary::new(key).fail(e),
        };

        if let Some(ref callback) = self.config.on_complete {
            callback(&summary);
        }
        summary
    }

    async fn fetch(&self, url: &Url) -> Result<Bytes> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;

        let mut body = BytesMut::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            body.extend_from_slice(&chunk?);
        }
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body.freeze())
    }
}
