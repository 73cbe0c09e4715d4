//! Load summary functionality.
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::loader::{Status, Summary};
//!
//! let summary = Summary::new("https://example.com/a.jpg".into()).with_size(2048);
//! assert_eq!(summary.status(), &Status::NotStarted);
//!
//! let failed = summary.fail("connection reset");
//! assert!(matches!(failed.status(), Status::Fail(_)));
//! ```

use crate::progress::RequestKey;

/// Load status enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Load failed with error message
    Fail(String),
    /// Load not yet started
    NotStarted,
    /// Load completed successfully
    Success,
}

/// Outcome of one load performed by [`Loader::load_all`](super::Loader::load_all).
#[derive(Debug, Clone)]
pub struct Summary {
    /// Key the load was tracked under.
    key: RequestKey,
    /// Body size in bytes.
    size: u64,
    /// Status.
    status: Status,
}

impl Summary {
    /// Create a new [`Summary`] for `key`.
    pub fn new(key: RequestKey) -> Self {
        Self {
            key,
            size: 0,
            status: Status::NotStarted,
        }
    }

    /// Attach a body size.
    pub fn with_size(self, size: u64) -> Self {
        Self { size, ..self }
    }

    /// Attach a status.
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Get the summary's key.
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Get the summary's size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Mark the summary as failed with a message.
    pub fn fail(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Fail(format!("{}", msg)),
            ..self
        }
    }
}
