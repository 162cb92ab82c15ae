//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use chat_proxy::config::ProxyConfig;
use chat_proxy::{HttpServer, Shutdown};

/// What the mock upstream answers with.
#[allow(dead_code)]
pub enum MockResponse {
    /// A buffered JSON response with the given status.
    Json { status: u16, body: String },
    /// A chunked stream: each entry is written and flushed separately,
    /// `delay` apart.
    Stream {
        content_type: &'static str,
        chunks: Vec<String>,
        delay: Duration,
    },
}

/// Start a programmable mock upstream.
///
/// The handler receives the full raw request (headers + body) so tests can
/// assert on what the proxy actually sent.
#[allow(dead_code)]
pub async fn start_mock_upstream<F, Fut>(addr: SocketAddr, f: F)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let raw = read_request(&mut socket).await;
                        match f(raw).await {
                            MockResponse::Json { status, body } => {
                                let status_text = match status {
                                    200 => "200 OK",
                                    400 => "400 Bad Request",
                                    429 => "429 Too Many Requests",
                                    500 => "500 Internal Server Error",
                                    503 => "503 Service Unavailable",
                                    _ => "200 OK",
                                };
                                let response = format!(
                                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    status_text,
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                            }
                            MockResponse::Stream {
                                content_type,
                                chunks,
                                delay,
                            } => {
                                let head = format!(
                                    "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
                                    content_type
                                );
                                let _ = socket.write_all(head.as_bytes()).await;
                                let _ = socket.flush().await;
                                for chunk in chunks {
                                    tokio::time::sleep(delay).await;
                                    let framed =
                                        format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
                                    let _ = socket.write_all(framed.as_bytes()).await;
                                    let _ = socket.flush().await;
                                }
                                let _ = socket.write_all(b"0\r\n\r\n").await;
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Read one HTTP/1.1 request (headers plus Content-Length body) as text.
#[allow(dead_code)]
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    loop {
        let n = match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&tmp[..n]);

        if let Some(header_end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

#[allow(dead_code)]
fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Baseline test config: HTTPS check off, upstream pointed at `upstream`.
pub fn test_config(bind: SocketAddr, upstream: SocketAddr) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = bind.to_string();
    config.upstream.base_url = format!("http://{}", upstream);
    config.upstream.api_key = "sk-internal-test-credential".to_string();
    config.upstream.timeout_secs = 10;
    config.security.require_https = false;
    config
}

/// Spawn the proxy on `bind` and return a shutdown handle for it.
pub async fn start_proxy(config: ProxyConfig) -> Shutdown {
    let bind: SocketAddr = config.listener.bind_address.parse().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind(bind).await.unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Let the listener come up before tests fire requests at it.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown
}

/// A client that never pools connections, so each request observes server
/// state fresh.
#[allow(dead_code)]
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
