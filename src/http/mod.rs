//! HTTP integration: the instrumented body types, the middleware installing
//! them and a ready-made client.
//!
//! # Overview
//!
//! - [`client`] - Client creation with tracing, retries and progress
//! - `middleware` - [`ProgressMiddleware`], the interceptor stage
//! - `stream` - [`ProgressBody`], [`ProgressStream`] and [`ProgressReader`] body decorators
//!
//! # Examples
//!
//! ```rust,no_run
//! use fetchmeter::dispatch;
//! use fetchmeter::http::{create_http_client, HttpClientConfig};
//! use fetchmeter::progress::{CallbackListener, ProgressRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (dispatcher, main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//! tokio::spawn(main_loop.run());
//!
//! let client = create_http_client(HttpClientConfig::default(), registry.clone())?;
//! let url = "https://httpbin.org/bytes/4096";
//! registry.expect(url, Arc::new(CallbackListener::new(5.0, |read, total| {
//!     println!("{read}/{total:?}");
//! })));
//! let body = client.get(url).send().await?.bytes().await?;
//! registry.forget(url);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub(crate) mod middleware;
pub(crate) mod stream;

pub use client::{create_http_client, HttpClientConfig};
pub use middleware::ProgressMiddleware;
pub use stream::{ProgressBody, ProgressReader, ProgressStream};
