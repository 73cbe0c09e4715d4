//! Progress tracking: listeners, the shared registry and the policy deciding
//! when a listener hears about new bytes.
//!
//! # Overview
//!
//! - `key` - Normalized request keys
//! - `listener` - The [`ProgressListener`] capability and a closure adapter
//! - `policy` - Granularity buckets limiting how often listeners are called
//! - `registry` - The shared [`ProgressRegistry`]
//! - `bar` / `style` - A terminal listener drawing an `indicatif` bar
//!
//! # Examples
//!
//! ## Tracking a Download with a Closure
//!
//! ```rust
//! use fetchmeter::dispatch;
//! use fetchmeter::progress::{CallbackListener, ProgressRegistry};
//! use std::sync::Arc;
//!
//! let (dispatcher, mut main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//!
//! let url = "https://example.com/photo.jpg";
//! registry.expect(url, Arc::new(CallbackListener::new(1.0, |read, total| {
//!     println!("{read} of {total:?} bytes");
//! })));
//!
//! // The instrumented body reports into the registry while it is read.
//! registry.update(url, 0, Some(2048));
//! registry.update(url, 2048, Some(2048));
//! assert_eq!(main_loop.run_pending(), 2);
//! assert!(!registry.is_expecting(url));
//! ```

pub(crate) mod bar;
pub(crate) mod key;
pub(crate) mod listener;
pub mod policy;
pub(crate) mod registry;
pub(crate) mod style;

pub use bar::BarListener;
pub use key::RequestKey;
pub use listener::{CallbackListener, ProgressListener};
pub use registry::ProgressRegistry;
pub use style::ProgressBarOpts;
