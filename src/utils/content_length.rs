//! Content length extraction utilities.
//!
//! reqwest derives [`Response::content_length`] from the body's size hint.
//! Bodies built from streams carry none, so the helpers below fall back to
//! the `Content-Length` header.

use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::Response;

/// The body length a response declares, if any.
///
/// Uses the exact body size hint first and the `Content-Length` header
/// second.
///
/// # Example
///
/// ```rust,no_run
/// use fetchmeter::utils::declared_content_length;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let response = reqwest::get("https://httpbin.org/bytes/1024").await?;
/// assert_eq!(declared_content_length(&response), Some(1024));
/// # Ok(())
/// # }
/// ```
pub fn declared_content_length(response: &Response) -> Option<u64> {
    response
        .content_length()
        .or_else(|| header_content_length(response.headers()))
}

/// Parse the `Content-Length` header.
///
/// Returns `None` if the header is missing or not a valid `u64`.
pub fn header_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}
