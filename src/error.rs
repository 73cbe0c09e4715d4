//! Error handling for the fetchmeter library.
//!
//! Progress tracking itself never fails: the registry and the granularity
//! policy only decide whether to call back. The errors below come from the
//! surfaces around it, namely building HTTP clients, rebuilding instrumented
//! responses and loading bodies through the [`Loader`](crate::Loader).

use thiserror::Error;

/// Errors that can happen when using fetchmeter.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying URL parser or the expected URL format.
    ///
    /// Returned when a URL handed to the loader cannot be parsed as an
    /// absolute HTTP(S) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Error from the Reqwest library.
    ///
    /// Network failures, HTTP status errors and body read errors.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// Error raised by one of the client middlewares (retry, tracing or
    /// progress instrumentation).
    #[error("Middleware error")]
    Middleware {
        #[from]
        source: reqwest_middleware::Error,
    },

    /// The instrumented response could not be reassembled.
    #[error("Failed to rebuild the instrumented response")]
    Http {
        #[from]
        source: http::Error,
    },
}

/// Result type alias for operations that can fail with a fetchmeter error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_failure_converts() {
        let source = http::Response::builder().status(1000).body(()).unwrap_err();
        let err = Error::from(source);
        assert!(matches!(err, Error::Http { .. }));
        assert_eq!(err.to_string(), "Failed to rebuild the instrumented response");
    }
}
