//! Loader module: fetch resources with progress reporting, one at a time or
//! in concurrent batches.
//!
//! # Overview
//!
//! - `loader` - Core [`Loader`] struct
//! - `builder` - [`LoaderBuilder`] for configuration
//! - `config` - Configuration structures and callback types
//! - `summary` - Per-load outcome of a batch
//!
//! # Examples
//!
//! ```rust,no_run
//! use fetchmeter::dispatch;
//! use fetchmeter::loader::{LoadRequest, LoaderBuilder};
//! use fetchmeter::progress::{BarListener, ProgressBarOpts, ProgressRegistry};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), fetchmeter::Error> {
//! let (dispatcher, main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//! tokio::spawn(main_loop.run());
//!
//! let loader = LoaderBuilder::new(registry).concurrent_loads(2).build()?;
//! let requests = ["https://example.com/a.jpg", "https://example.com/b.jpg"]
//!     .into_iter()
//!     .map(|url| {
//!         LoadRequest::try_from(url).map(|r| {
//!             r.with_listener(Arc::new(BarListener::new(ProgressBarOpts::default(), 1.0)))
//!         })
//!     })
//!     .collect::<Result<Vec<_>, _>>()?;
//! let summaries = loader.load_all(&requests).await;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod loader;
pub mod summary;

pub use builder::LoaderBuilder;
pub use config::{LoadCallback, LoaderConfig};
pub use loader::{LoadRequest, Loader};
pub use summary::{Status, Summary};
