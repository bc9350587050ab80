//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use precedent_proxy::config::ProxyConfig;
use precedent_proxy::http::HttpServer;
use precedent_proxy::lifecycle::Shutdown;

/// Request targets (path + query) seen by a mock upstream, in arrival order.
pub type SeenTargets = Arc<Mutex<Vec<String>>>;

/// Start a programmable mock upstream on an ephemeral port.
///
/// `f` receives the request target and returns the status and XML body.
pub async fn start_programmable_upstream<F>(f: F) -> (SocketAddr, SeenTargets)
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);
    let seen: SeenTargets = Arc::new(Mutex::new(Vec::new()));
    let seen_by_task = seen.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let seen = seen_by_task.clone();
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await;
                        seen.lock().unwrap().push(target.clone());

                        let (status, body) = f(&target);
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/xml;charset=UTF-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// Start a mock upstream that always answers 200 with `body`.
#[allow(dead_code)]
pub async fn start_mock_upstream(body: String) -> (SocketAddr, SeenTargets) {
    start_programmable_upstream(move |_| (200, body.clone())).await
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Run a proxy whose upstream base URL is `http://{upstream}/svc`.
///
/// The returned [`Shutdown`] stops the server when triggered or dropped
/// with the test runtime.
#[allow(dead_code)]
pub async fn start_proxy(upstream: SocketAddr) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = format!("http://{upstream}/svc");
    config.upstream.timeout_secs = Some(5);
    start_proxy_with(config).await
}

#[allow(dead_code)]
pub async fn start_proxy_with(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    (addr, shutdown)
}

#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Wrap `items` in a normal upstream response.
#[allow(dead_code)]
pub fn upstream_page(total_count: u64, items: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <response><header><resultCode>00</resultCode><resultMsg>NORMAL SERVICE.</resultMsg></header>\
         <body><items>{items}</items><numOfRows>10</numOfRows><pageNo>1</pageNo>\
         <totalCount>{total_count}</totalCount></body></response>"
    )
}

/// One `<item>` with the given child elements.
#[allow(dead_code)]
pub fn item(fields: &[(&str, &str)]) -> String {
    let inner: String = fields
        .iter()
        .map(|(tag, value)| format!("<{tag}>{value}</{tag}>"))
        .collect();
    format!("<item>{inner}</item>")
}

async fn read_request_target(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string()
}
