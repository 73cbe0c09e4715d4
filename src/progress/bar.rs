//! Terminal progress listener backed by an `indicatif` progress bar.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fetchmeter::progress::{BarListener, ProgressBarOpts};
//! use std::sync::Arc;
//!
//! let listener = Arc::new(
//!     BarListener::new(ProgressBarOpts::bytes(), 1.0).with_message("image.jpg"),
//! );
//! ```

use super::listener::ProgressListener;
use super::style::ProgressBarOpts;
use indicatif::ProgressBar;
use std::fmt;

/// A [`ProgressListener`] moving a terminal progress bar.
///
/// The bar length follows the declared body length; it is finished (or
/// cleared, depending on [`ProgressBarOpts`]) on the completion callback.
#[derive(Clone)]
pub struct BarListener {
    bar: ProgressBar,
    granularity: f32,
    clear: bool,
}

impl BarListener {
    /// Create a listener with a fresh bar built from `opts`.
    pub fn new(opts: ProgressBarOpts, granularity: f32) -> Self {
        let clear = opts.clear;
        Self {
            bar: opts.to_progress_bar(),
            granularity,
            clear,
        }
    }

    /// Attach a message shown next to the bar.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        self.bar.set_message(message.into());
        self
    }

    /// The underlying progress bar.
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl fmt::Debug for BarListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarListener")
            .field("position", &self.bar.position())
            .field("length", &self.bar.length())
            .field("granularity", &self.granularity)
            .finish()
    }
}

impl ProgressListener for BarListener {
    fn on_progress(&self, bytes_read: u64, expected_length: Option<u64>) {
        if let Some(len) = expected_length {
            if self.bar.length() != Some(len) {
                self.bar.set_length(len);
            }
        }
        self.bar.set_position(bytes_read);

        if expected_length == Some(bytes_read) {
            if self.clear {
                self.bar.finish_and_clear();
            } else {
                self.bar.finish();
            }
        }
    }

    fn granularity_percentage(&self) -> f32 {
        self.granularity
    }
}
