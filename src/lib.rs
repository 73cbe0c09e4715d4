//! fetchmeter turns HTTP response body reads into throttled progress
//! callbacks that are safe to consume from a UI thread.
//!
//! A [`ProgressMiddleware`] installed in a `reqwest-middleware` client wraps
//! every response body with a counting stream. While the consumer reads, the
//! running byte count is reported to a shared [`ProgressRegistry`], which
//! looks up the listener registered for the request URL, asks the
//! granularity policy whether the update is worth a callback and posts it
//! through a [`Dispatcher`] onto the listener's own context.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fetchmeter::{dispatch, CallbackListener, LoaderBuilder, ProgressRegistry};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), fetchmeter::Error> {
//! let (dispatcher, main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//! tokio::spawn(main_loop.run());
//!
//! let loader = LoaderBuilder::new(registry).build()?;
//! let body = loader
//!     .load(
//!         "https://httpbin.org/bytes/65536",
//!         Arc::new(CallbackListener::new(1.0, |read, total| {
//!             println!("{read}/{total:?}");
//!         })),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`dispatch`] - The dispatch bridge onto the listeners' context
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`http`] - Instrumented bodies, the middleware and client setup
//! - [`loader`] - Register, fetch and forget in one call
//! - [`progress`] - Listeners, the registry and the granularity policy
//! - [`utils`] - Shared utility functions

pub mod dispatch;
pub mod error;
pub mod http;
pub mod loader;
pub mod progress;
pub mod utils;

pub use dispatch::{ChannelDispatcher, Dispatcher, MainLoop};
pub use error::{Error, Result};
pub use self::http::{
    create_http_client, HttpClientConfig, ProgressBody, ProgressMiddleware, ProgressReader,
    ProgressStream,
};
pub use loader::{LoadRequest, Loader, LoaderBuilder, Status, Summary};
pub use progress::{
    BarListener, CallbackListener, ProgressBarOpts, ProgressListener, ProgressRegistry, RequestKey,
};
