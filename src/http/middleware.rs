//! Client middleware instrumenting response bodies.
//!
//! [`ProgressMiddleware`] forwards each request unchanged and swaps the body
//! of the response for a [`ProgressBody`] over the original one. Status,
//! version, headers, extensions, URL and the declared body length are kept,
//! so consumers cannot tell the difference. Responses that cannot carry a
//! body (`HEAD`, 1xx, 204 and 304) are passed through as they are. Install
//! it last so that it sits closest to the network: retry and tracing
//! middlewares run around it untouched.
//!
//! # Examples
//!
//! ```rust
//! use fetchmeter::dispatch;
//! use fetchmeter::http::ProgressMiddleware;
//! use fetchmeter::progress::ProgressRegistry;
//! use reqwest_middleware::ClientBuilder;
//! use std::sync::Arc;
//!
//! let (dispatcher, _main_loop) = dispatch::channel();
//! let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
//!
//! let client = ClientBuilder::new(reqwest::Client::new())
//!     .with(ProgressMiddleware::new(registry))
//!     .build();
//! ```

use super::stream::ProgressBody;
use crate::progress::{ProgressRegistry, RequestKey};
use crate::utils::declared_content_length;

use http::Extensions;
use reqwest::{Method, Request, Response, ResponseBuilderExt, StatusCode};
use reqwest_middleware::{Middleware, Next};
use std::sync::Arc;
use tracing::trace;

/// Whether a response to `method` with `status` can carry a body.
fn has_body(method: &Method, status: StatusCode) -> bool {
    *method != Method::HEAD
        && !status.is_informational()
        && status != StatusCode::NO_CONTENT
        && status != StatusCode::NOT_MODIFIED
}

/// Middleware wrapping every response body with progress reporting.
#[derive(Debug, Clone)]
pub struct ProgressMiddleware {
    registry: Arc<ProgressRegistry>,
}

impl ProgressMiddleware {
    /// Report the progress of every response into `registry`.
    pub fn new(registry: Arc<ProgressRegistry>) -> Self {
        Self { registry }
    }

    /// The registry bodies report into.
    pub fn registry(&self) -> &Arc<ProgressRegistry> {
        &self.registry
    }

    /// Replace the body of `response` with an instrumented one reporting
    /// under `key`.
    pub fn instrument(
        &self,
        key: RequestKey,
        response: Response,
    ) -> Result<Response, crate::Error> {
        let content_length = declared_content_length(&response);
        trace!("Instrumenting body of {} ({:?} bytes)", key, content_length);

        let url = response.url().clone();
        let (parts, body) = http::Response::<reqwest::Body>::from(response).into_parts();
        let body = ProgressBody::new(body, key, content_length, self.registry.clone());

        let mut builder = http::Response::builder()
            .status(parts.status)
            .version(parts.version)
            .url(url);
        if let Some(headers) = builder.headers_mut() {
            *headers = parts.headers;
        }
        if let Some(extensions) = builder.extensions_mut() {
            extensions.extend(parts.extensions);
        }
        let instrumented = builder.body(reqwest::Body::wrap(body))?;
        Ok(instrumented.into())
    }
}

#[async_trait::async_trait]
impl Middleware for ProgressMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        // Listeners register the URL they asked for, not the one a redirect
        // may have landed on.
        let key = RequestKey::from(req.url());
        let method = req.method().clone();
        let response = next.run(req, extensions).await?;
        if !has_body(&method, response.status()) {
            trace!("{} {} ({}) has no body to track", method, key, response.status());
            return Ok(response);
        }
        self.instrument(key, response)
            .map_err(reqwest_middleware::Error::middleware)
    }
}
