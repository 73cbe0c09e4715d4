//! Bridge that marshals progress callbacks onto a designated context.
//!
//! Body reads happen on worker tasks; listeners usually belong to a UI or
//! some other single-threaded owner. The registry therefore never calls a
//! listener directly: it hands a task to a [`Dispatcher`], and whoever owns
//! the target context drives the matching [`MainLoop`].
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::dispatch::{self, Dispatcher};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let (dispatcher, mut main_loop) = dispatch::channel();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let counter = hits.clone();
//! dispatcher.post(Box::new(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//! assert_eq!(hits.load(Ordering::SeqCst), 0);
//!
//! assert_eq!(main_loop.run_pending(), 1);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// A unit of work posted to the dispatch context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Posts tasks onto an execution context owned by someone else.
pub trait Dispatcher: Send + Sync {
    /// Enqueue `task` and return immediately.
    ///
    /// Execution is eventual, in enqueue order relative to other posts made
    /// through the same dispatcher.
    fn post(&self, task: Task);
}

/// Create a connected dispatcher and main loop pair.
pub fn channel() -> (ChannelDispatcher, MainLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelDispatcher { tx }, MainLoop { rx })
}

/// Sending half of [`channel`]. Cheap to clone; every clone feeds the same
/// loop.
#[derive(Clone)]
pub struct ChannelDispatcher {
    tx: UnboundedSender<Task>,
}

impl Dispatcher for ChannelDispatcher {
    fn post(&self, task: Task) {
        // The loop is gone: nobody is left to observe the callback.
        if self.tx.send(task).is_err() {
            trace!("Dropping progress callback, main loop has shut down");
        }
    }
}

impl fmt::Debug for ChannelDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelDispatcher")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Receiving half of [`channel`]; runs posted tasks in order.
pub struct MainLoop {
    rx: UnboundedReceiver<Task>,
}

impl MainLoop {
    /// Run tasks until every dispatcher handle has been dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.rx.recv().await {
            task();
        }
    }

    /// Blocking flavour of [`MainLoop::run`] for a dedicated thread.
    ///
    /// Panics when called from within an async runtime.
    pub fn run_blocking(mut self) {
        while let Some(task) = self.rx.blocking_recv() {
            task();
        }
    }

    /// Run every task queued so far and return how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl fmt::Debug for MainLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainLoop").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_tasks_run_in_post_order() {
        let (dispatcher, mut main_loop) = channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let seen = seen.clone();
            dispatcher.post(Box::new(move || seen.lock().push(i)));
        }
        assert!(seen.lock().is_empty());
        assert_eq!(main_loop.run_pending(), 5);
        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
        assert_eq!(main_loop.run_pending(), 0);
    }

    #[test]
    fn test_post_after_loop_dropped_is_silent() {
        let (dispatcher, main_loop) = channel();
        drop(main_loop);
        dispatcher.post(Box::new(|| panic!("must never run")));
    }

    #[tokio::test]
    async fn test_run_ends_when_dispatchers_dropped() {
        let (dispatcher, main_loop) = channel();
        let seen = Arc::new(Mutex::new(0));
        let counter = seen.clone();
        dispatcher.post(Box::new(move || *counter.lock() += 1));
        drop(dispatcher);
        main_loop.run().await;
        assert_eq!(*seen.lock(), 1);
    }
}
