//! Listener capability notified about a transfer's progress.

use std::fmt;

/// Receives progress callbacks for one registered transfer.
///
/// Callbacks always run on the context behind the registry's
/// [`Dispatcher`](crate::dispatch::Dispatcher), never on the thread reading
/// the body.
pub trait ProgressListener: Send + Sync {
    /// Called with the bytes read so far and the declared body length.
    ///
    /// `expected_length` is `None` while the server did not declare a length.
    /// The final call of a successful transfer has
    /// `Some(bytes_read) == expected_length`.
    fn on_progress(&self, bytes_read: u64, expected_length: Option<u64>);

    /// How often the listener needs an update, in percent.
    ///
    /// `0.2` asks for a callback roughly every 0.2% of progress; `0.0` asks
    /// for every read. 0% and 100% are always dispatched. Read once, when
    /// the listener is registered.
    fn granularity_percentage(&self) -> f32;
}

/// A [`ProgressListener`] built from a closure.
///
/// ```rust
/// use fetchmeter::progress::CallbackListener;
///
/// let listener = CallbackListener::new(1.0, |read, total| {
///     if let Some(total) = total {
///         println!("{}%", 100 * read / total.max(1));
///     }
/// });
/// ```
pub struct CallbackListener<F> {
    granularity: f32,
    callback: F,
}

impl<F> CallbackListener<F>
where
    F: Fn(u64, Option<u64>) + Send + Sync,
{
    /// Create a listener notified every `granularity` percent.
    pub fn new(granularity: f32, callback: F) -> Self {
        Self {
            granularity,
            callback,
        }
    }
}

impl<F> ProgressListener for CallbackListener<F>
where
    F: Fn(u64, Option<u64>) + Send + Sync,
{
    fn on_progress(&self, bytes_read: u64, expected_length: Option<u64>) {
        (self.callback)(bytes_read, expected_length)
    }

    fn granularity_percentage(&self) -> f32 {
        self.granularity
    }
}

impl<F> fmt::Debug for CallbackListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackListener")
            .field("granularity", &self.granularity)
            .finish()
    }
}
