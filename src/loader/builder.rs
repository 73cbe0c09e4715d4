//! Builder pattern implementation for creating Loader instances.
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::dispatch;
//! use fetchmeter::loader::{LoaderBuilder, Status};
//! use fetchmeter::progress::ProgressRegistry;
//! use reqwest::header::{self, HeaderValue};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), fetchmeter::Error> {
//! let (dispatcher, _main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//!
//! let loader = LoaderBuilder::new(registry)
//!     .retries(2)
//!     .concurrent_loads(4)
//!     .header(header::USER_AGENT, HeaderValue::from_static("fetchmeter"))
//!     .on_complete(|summary| {
//!         if let Status::Fail(msg) = summary.status() {
//!             eprintln!("{}: {}", summary.key(), msg);
//!         }
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::LoaderConfig, loader::Loader, summary::Summary};
use crate::progress::ProgressRegistry;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::sync::Arc;

/// A builder used to create a [`Loader`].
#[derive(Debug)]
pub struct LoaderBuilder {
    config: LoaderConfig,
    registry: Arc<ProgressRegistry>,
}

impl LoaderBuilder {
    /// Creates a builder with the default options, reporting into `registry`.
    pub fn new(registry: Arc<ProgressRegistry>) -> Self {
        Self {
            config: LoaderConfig::default(),
            registry,
        }
    }

    /// Set the number of retries per request.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set the number of concurrent loads in a batch.
    pub fn concurrent_loads(mut self, concurrent_loads: usize) -> Self {
        self.config.concurrent_loads = concurrent_loads.max(1);
        self
    }

    /// Route requests through `proxy`.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set callback for when each load of a batch completes.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Add the http headers.
    ///
    /// Calling `.headers()` multiple times merges every `HeaderMap`.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.config
            .headers
            .get_or_insert_with(HeaderMap::new)
            .extend(headers);
        self
    }

    /// Add the http header
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.config
            .headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    /// Create the [`Loader`] with the specified options.
    pub fn build(self) -> crate::Result<Loader> {
        Loader::new(self.config, self.registry)
    }
}
