//! Configuration structures and defaults for the loader.
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::loader::{LoadCallback, Status, Summary};
//!
//! let callback: LoadCallback = Box::new(|summary: &Summary| {
//!     match summary.status() {
//!         Status::Success => println!("loaded {} ({} bytes)", summary.key(), summary.size()),
//!         Status::Fail(msg) => println!("failed {}: {}", summary.key(), msg),
//!         Status::NotStarted => {}
//!     }
//! });
//! ```

use super::summary::Summary;

use reqwest::header::HeaderMap;
use std::sync::Arc;

/// Callback type for load completion events
pub type LoadCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Configuration structure for the loader
#[derive(Clone)]
pub struct LoaderConfig {
    /// Number of retries per request.
    pub retries: u32,
    /// Number of maximum concurrent loads.
    pub concurrent_loads: usize,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Callback for when each load of a batch completes.
    pub on_complete: Option<Arc<LoadCallback>>,
}

impl std::fmt::Debug for LoaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("retries", &self.retries)
            .field("concurrent_loads", &self.concurrent_loads)
            .field("headers", &self.headers)
            .field("proxy", &self.proxy)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            concurrent_loads: 8,
            headers: None,
            proxy: None,
            on_complete: None,
        }
    }
}
