//! Shared registry of listeners waiting for transfer progress.
//!
//! One registry is created at startup and shared (behind an [`Arc`]) between
//! the code registering listeners and the [`ProgressMiddleware`] that
//! instruments response bodies. Any number of concurrent transfers report
//! into it; each key keeps its own bucket state.
//!
//! [`ProgressMiddleware`]: crate::http::ProgressMiddleware
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::dispatch;
//! use fetchmeter::progress::{CallbackListener, ProgressRegistry};
//! use std::sync::Arc;
//!
//! let (dispatcher, mut main_loop) = dispatch::channel();
//! let registry = ProgressRegistry::new(Arc::new(dispatcher));
//!
//! registry.expect(
//!     "https://example.com/image.jpg",
//!     Arc::new(CallbackListener::new(10.0, |read, total| {
//!         println!("{read}/{total:?}");
//!     })),
//! );
//! registry.update("https://example.com/image.jpg", 512, Some(1024));
//! main_loop.run_pending();
//!
//! registry.forget("https://example.com/image.jpg");
//! ```

use super::key::RequestKey;
use super::listener::ProgressListener;
use super::policy;
use crate::dispatch::Dispatcher;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Listener registered for a key, its granularity read at registration and
/// the last bucket reported to it.
struct Entry {
    listener: Arc<dyn ProgressListener>,
    granularity: f32,
    last_bucket: Option<u64>,
}

/// Process-wide map from request key to its listener.
pub struct ProgressRegistry {
    entries: Mutex<HashMap<RequestKey, Entry>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl ProgressRegistry {
    /// Create an empty registry posting callbacks through `dispatcher`.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Register `listener` for `key`, replacing any previous listener.
    ///
    /// The listener's granularity is read once, here. No listener code runs
    /// while the registry is locked.
    pub fn expect(&self, key: impl Into<RequestKey>, listener: Arc<dyn ProgressListener>) {
        let key = key.into();
        let granularity = policy::sanitize_granularity(listener.granularity_percentage());
        debug!("Expecting progress for {} every {}%", key, granularity);
        let previous = self.entries.lock().insert(
            key,
            Entry {
                listener,
                granularity,
                last_bucket: None,
            },
        );
        if previous.is_some() {
            trace!("Replaced an existing progress listener");
        }
    }

    /// Drop the listener and bucket state for `key`, if any.
    pub fn forget(&self, key: impl Into<RequestKey>) {
        let key = key.into();
        if self.entries.lock().remove(&key).is_some() {
            debug!("Forgot progress listener for {}", key);
        }
    }

    /// Report `bytes_read` out of `content_length` for `key`.
    ///
    /// Unknown keys are ignored. Once `bytes_read` reaches the declared
    /// length the key is forgotten before the final callback is posted, so a
    /// transfer completes at most once.
    pub fn update(&self, key: impl Into<RequestKey>, bytes_read: u64, content_length: Option<u64>) {
        self.report(&key.into(), bytes_read, content_length)
    }

    /// [`update`](Self::update) for an already normalized key, without
    /// cloning it. Used on the body read path.
    pub(crate) fn report(&self, key: &RequestKey, bytes_read: u64, content_length: Option<u64>) {
        let listener = {
            let mut entries = self.entries.lock();
            let complete = content_length.is_some_and(|len| len <= bytes_read);
            if complete {
                let Some(mut entry) = entries.remove(key) else {
                    return;
                };
                debug!("Transfer of {} complete after {} bytes", key, bytes_read);
                Self::decide(&mut entry, bytes_read, content_length)
            } else {
                let Some(entry) = entries.get_mut(key) else {
                    return;
                };
                Self::decide(entry, bytes_read, content_length)
            }
        };

        if let Some(listener) = listener {
            trace!("Dispatching {}/{:?} bytes for {}", bytes_read, content_length, key);
            self.dispatcher.post(Box::new(move || {
                listener.on_progress(bytes_read, content_length)
            }));
        }
    }

    /// Whether a listener is currently registered for `key`.
    pub fn is_expecting(&self, key: impl Into<RequestKey>) -> bool {
        let key: RequestKey = key.into();
        self.entries.lock().contains_key(&key)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn decide(
        entry: &mut Entry,
        bytes_read: u64,
        content_length: Option<u64>,
    ) -> Option<Arc<dyn ProgressListener>> {
        policy::needs_dispatch(
            &mut entry.last_bucket,
            bytes_read,
            content_length,
            entry.granularity,
        )
            .then(|| entry.listener.clone())
    }
}

impl fmt::Debug for ProgressRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressRegistry")
            .field("expecting", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{self, MainLoop};
    use crate::progress::CallbackListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    type Calls = Arc<Mutex<Vec<(u64, Option<u64>)>>>;

    fn recorder(granularity: f32) -> (Arc<dyn ProgressListener>, Calls) {
        let calls: Calls = Arc::default();
        let sink = calls.clone();
        let listener = CallbackListener::new(granularity, move |read, total| {
            sink.lock().push((read, total))
        });
        (Arc::new(listener), calls)
    }

    fn registry() -> (ProgressRegistry, MainLoop) {
        let (dispatcher, main_loop) = dispatch::channel();
        (ProgressRegistry::new(Arc::new(dispatcher)), main_loop)
    }

    #[test]
    fn test_callbacks_are_never_inline() {
        let (registry, mut main_loop) = registry();
        let (listener, calls) = recorder(0.0);
        registry.expect("a", listener);

        registry.update("a", 5, Some(10));
        assert!(calls.lock().is_empty());

        assert_eq!(main_loop.run_pending(), 1);
        assert_eq!(*calls.lock(), vec![(5, Some(10))]);
    }

    #[test]
    fn test_completion_forgets_before_dispatch() {
        let (registry, mut main_loop) = registry();
        let (listener, calls) = recorder(1.0);
        registry.expect("a", listener);

        registry.update("a", 100, Some(100));
        assert!(!registry.is_expecting("a"));
        registry.update("a", 100, Some(100));
        registry.update("a", 120, Some(100));

        main_loop.run_pending();
        assert_eq!(*calls.lock(), vec![(100, Some(100))]);
    }

    #[test]
    fn test_last_registration_wins() {
        let (registry, mut main_loop) = registry();
        let (first, first_calls) = recorder(0.0);
        let (second, second_calls) = recorder(0.0);
        registry.expect("a", first);
        registry.expect("a", second);
        assert_eq!(registry.len(), 1);

        registry.update("a", 1, Some(10));
        main_loop.run_pending();
        assert!(first_calls.lock().is_empty());
        assert_eq!(*second_calls.lock(), vec![(1, Some(10))]);
    }

    #[test]
    fn test_reregistration_resets_bucket() {
        let (registry, mut main_loop) = registry();
        let (listener, calls) = recorder(50.0);
        registry.expect("a", listener.clone());
        registry.update("a", 10, Some(100));
        registry.expect("a", listener);
        registry.update("a", 20, Some(100));

        main_loop.run_pending();
        assert_eq!(calls.lock().len(), 2);
    }

    #[test]
    fn test_forget_missing_key_is_noop() {
        let (registry, mut main_loop) = registry();
        registry.forget("missing-key");
        registry.forget("missing-key");
        assert!(registry.is_empty());
        assert_eq!(main_loop.run_pending(), 0);
    }

    /// Calls back into the registry from its own getter.
    struct Reentrant {
        registry: Arc<ProgressRegistry>,
        granularity_reads: AtomicUsize,
        calls: Calls,
    }

    impl ProgressListener for Reentrant {
        fn on_progress(&self, bytes_read: u64, expected_length: Option<u64>) {
            self.calls.lock().push((bytes_read, expected_length));
        }

        fn granularity_percentage(&self) -> f32 {
            self.granularity_reads.fetch_add(1, Ordering::SeqCst);
            self.registry.len() as f32
        }
    }

    #[test]
    fn test_listener_code_never_runs_under_the_lock() {
        let (dispatcher, mut main_loop) = dispatch::channel();
        let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
        let listener = Arc::new(Reentrant {
            registry: registry.clone(),
            granularity_reads: AtomicUsize::new(0),
            calls: Arc::default(),
        });
        registry.expect("k", listener.clone());

        let (done_tx, done_rx) = mpsc::channel();
        let reader = registry.clone();
        thread::spawn(move || {
            reader.update("k", 10, Some(100));
            reader.update("k", 100, Some(100));
            let _ = done_tx.send(());
        });
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("update blocked on the registry lock");

        main_loop.run_pending();
        assert_eq!(*listener.calls.lock(), vec![(10, Some(100)), (100, Some(100))]);
        assert_eq!(listener.granularity_reads.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }
}
