#![allow(dead_code)]

use fetchmeter::dispatch::{self, MainLoop};
use fetchmeter::{CallbackListener, ProgressListener, ProgressRegistry};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// Common test constants
pub const TEST_KEY: &str = "https://example.com/image.jpg";
pub const TEST_CONTENT_TYPE: &str = "image/jpeg";
pub const TEST_CHUNK_SIZE: usize = 1024;

/// Progress calls observed by a recording listener.
pub type Calls = Arc<Mutex<Vec<(u64, Option<u64>)>>>;

// === Registry Helpers ===

/// Creates a registry together with the loop its callbacks are posted to
pub fn create_test_registry() -> (Arc<ProgressRegistry>, MainLoop) {
    let (dispatcher, main_loop) = dispatch::channel();
    (Arc::new(ProgressRegistry::new(Arc::new(dispatcher))), main_loop)
}

/// Creates a listener recording every callback it receives
pub fn create_recording_listener(granularity: f32) -> (Arc<dyn ProgressListener>, Calls) {
    let calls: Calls = Arc::default();
    let sink = calls.clone();
    let listener = CallbackListener::new(granularity, move |read, total| {
        sink.lock().push((read, total));
    });
    (Arc::new(listener), calls)
}

/// Registers a recording listener for `key`
pub fn expect_recorded(registry: &ProgressRegistry, key: &str, granularity: f32) -> Calls {
    let (listener, calls) = create_recording_listener(granularity);
    registry.expect(key, listener);
    calls
}

/// Snapshot of the recorded calls
pub fn recorded(calls: &Calls) -> Vec<(u64, Option<u64>)> {
    calls.lock().clone()
}

// === Content Helpers ===

/// Creates test content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Asserts the calls of one transfer end with a single completion
pub fn assert_single_completion(calls: &[(u64, Option<u64>)], total: u64) {
    let completions = calls
        .iter()
        .filter(|(read, len)| *len == Some(*read) && *read == total)
        .count();
    assert_eq!(completions, 1, "expected exactly one completion in {:?}", calls);
    assert_eq!(calls.last(), Some(&(total, Some(total))));
}

// === Test Server ===

/// A tiny HTTP/1.1 server serving canned bodies:
///
/// - `/bytes/{n}`: `n` bytes with a `Content-Length` (headers only for `HEAD`)
/// - `/chunked/{n}`: `n` bytes with chunked encoding (no declared length)
/// - anything else: `404 Not Found`
pub struct TestServer {
    addr: std::net::SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local address");
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(serve(socket));
            }
        });
        Self { addr }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn serve(mut socket: TcpStream) {
    let mut head = Vec::new();
    let mut buf = [0u8; 512];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    let head = String::from_utf8_lossy(&head);
    let mut request_line = head.split_whitespace();
    let method = request_line.next().unwrap_or("GET").to_string();
    let path = request_line.next().unwrap_or("/").to_string();

    let mut segments = path.trim_start_matches('/').splitn(2, '/');
    let kind = segments.next().unwrap_or_default();
    let size = segments.next().and_then(|s| s.parse::<usize>().ok());

    match (kind, size) {
        ("bytes", Some(size)) => {
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
                size, TEST_CONTENT_TYPE
            );
            if socket.write_all(header.as_bytes()).await.is_err() || method == "HEAD" {
                let _ = socket.shutdown().await;
                return;
            }
            for chunk in create_test_content(size).chunks(TEST_CHUNK_SIZE) {
                if socket.write_all(chunk).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
                tokio::task::yield_now().await;
            }
        }
        ("chunked", Some(size)) => {
            let header = format!(
                "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
                TEST_CONTENT_TYPE
            );
            if socket.write_all(header.as_bytes()).await.is_err() {
                return;
            }
            for chunk in create_test_content(size).chunks(TEST_CHUNK_SIZE) {
                let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
                frame.extend_from_slice(chunk);
                frame.extend_from_slice(b"\r\n");
                if socket.write_all(&frame).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        }
        _ => {
            let _ = socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found")
                .await;
        }
    }
    let _ = socket.shutdown().await;
}
