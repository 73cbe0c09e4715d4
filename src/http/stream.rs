//! Pass-through body decorators counting the bytes flowing through them.
//!
//! [`ProgressBody`] wraps an [`http_body::Body`] (what the middleware
//! installs), [`ProgressStream`] an async stream of body chunks and
//! [`ProgressReader`] a blocking [`std::io::Read`]. All of them yield exactly
//! what the inner source yields and report the running total to the
//! [`ProgressRegistry`] after every successful read. Failed reads report
//! nothing.

use crate::progress::{ProgressRegistry, RequestKey};

use bytes::{Buf, Bytes};
use futures::Stream;
use http_body::{Body, Frame, SizeHint};
use std::fmt;
use std::io::{self, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::debug;

/// Running byte count of one transfer.
struct Tally {
    key: RequestKey,
    bytes_read: u64,
    content_length: Option<u64>,
    registry: Arc<ProgressRegistry>,
    finished: bool,
}

impl Tally {
    fn new(key: RequestKey, content_length: Option<u64>, registry: Arc<ProgressRegistry>) -> Self {
        Self {
            key,
            bytes_read: 0,
            content_length,
            registry,
            finished: false,
        }
    }

    fn add(&mut self, n: usize) {
        self.bytes_read += n as u64;
        self.report();
    }

    /// End of stream: jump to the declared length so the listener always sees
    /// 100%. Without a declared length, what was read becomes the length.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        match self.content_length {
            Some(len) => {
                if len != self.bytes_read {
                    debug!(
                        "Body of {} ended after {} bytes, {} were declared",
                        self.key, self.bytes_read, len
                    );
                }
                self.bytes_read = len;
            }
            None => self.content_length = Some(self.bytes_read),
        }
        self.report();
    }

    fn report(&self) {
        self.registry
            .report(&self.key, self.bytes_read, self.content_length);
    }
}

impl fmt::Debug for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tally")
            .field("key", &self.key)
            .field("bytes_read", &self.bytes_read)
            .field("content_length", &self.content_length)
            .finish()
    }
}

/// A chunk stream reporting its progress to a [`ProgressRegistry`].
#[derive(Debug)]
pub struct ProgressStream<S> {
    inner: S,
    tally: Tally,
}

impl<S> ProgressStream<S> {
    /// Wrap `inner`, whose body is expected to be `content_length` bytes long.
    pub fn new(
        inner: S,
        key: impl Into<RequestKey>,
        content_length: Option<u64>,
        registry: Arc<ProgressRegistry>,
    ) -> Self {
        Self {
            inner,
            tally: Tally::new(key.into(), content_length, registry),
        }
    }

    /// Bytes seen so far (the declared length once the stream has ended).
    pub fn bytes_read(&self) -> u64 {
        self.tally.bytes_read
    }

    /// Unwrap the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, E> Stream for ProgressStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.tally.add(chunk.len());
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(None) => {
                this.tally.finish();
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An HTTP body reporting its progress to a [`ProgressRegistry`].
///
/// Only data frames are counted. The size hint and end-of-stream state are
/// the inner body's, so a response carrying it still declares its length.
#[derive(Debug)]
pub struct ProgressBody<B> {
    inner: B,
    tally: Tally,
}

impl<B> ProgressBody<B> {
    /// Wrap `inner`, whose body is expected to be `content_length` bytes long.
    pub fn new(
        inner: B,
        key: impl Into<RequestKey>,
        content_length: Option<u64>,
        registry: Arc<ProgressRegistry>,
    ) -> Self {
        Self {
            inner,
            tally: Tally::new(key.into(), content_length, registry),
        }
    }

    /// Bytes seen so far (the declared length once the body has ended).
    pub fn bytes_read(&self) -> u64 {
        self.tally.bytes_read
    }

    /// Unwrap the inner body.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B> Body for ProgressBody<B>
where
    B: Body + Unpin,
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.tally.add(data.remaining());
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(None) => {
                this.tally.finish();
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

/// A blocking reader reporting its progress to a [`ProgressRegistry`].
///
/// ```rust
/// use fetchmeter::dispatch;
/// use fetchmeter::http::ProgressReader;
/// use fetchmeter::progress::ProgressRegistry;
/// use std::io::{Cursor, Read};
/// use std::sync::Arc;
///
/// let (dispatcher, _main_loop) = dispatch::channel();
/// let registry = Arc::new(ProgressRegistry::new(Arc::new(dispatcher)));
///
/// let body = vec![7u8; 64];
/// let mut reader = ProgressReader::new(Cursor::new(body.clone()), "file:///body", Some(64), registry);
/// let mut out = Vec::new();
/// reader.read_to_end(&mut out).unwrap();
/// assert_eq!(out, body);
/// assert_eq!(reader.bytes_read(), 64);
/// ```
#[derive(Debug)]
pub struct ProgressReader<R> {
    inner: R,
    tally: Tally,
}

impl<R> ProgressReader<R> {
    /// Wrap `inner`, whose body is expected to be `content_length` bytes long.
    pub fn new(
        inner: R,
        key: impl Into<RequestKey>,
        content_length: Option<u64>,
        registry: Arc<ProgressRegistry>,
    ) -> Self {
        Self {
            inner,
            tally: Tally::new(key.into(), content_length, registry),
        }
    }

    /// Bytes seen so far (the declared length once the reader has ended).
    pub fn bytes_read(&self) -> u64 {
        self.tally.bytes_read
    }

    /// Unwrap the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.tally.finish();
        } else {
            self.tally.add(n);
        }
        Ok(n)
    }
}
