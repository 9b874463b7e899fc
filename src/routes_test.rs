use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::*;
use crate::config::default_web_dir;

// =============================================================================
// Helpers
// =============================================================================

async fn spawn_app() -> SocketAddr {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let config = HostConfig { bind: addr, web_dir: default_web_dir() };
    let router = app(&config);
    tokio::spawn(async move { axum::serve(listener, router).await });
    addr
}

async fn get_raw(addr: SocketAddr, path: &str) -> String {
    let Ok(mut stream) = TcpStream::connect(addr).await else {
        panic!("connect failed");
    };
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    assert!(stream.write_all(request.as_bytes()).await.is_ok());
    let mut response = String::new();
    assert!(stream.read_to_string(&mut response).await.is_ok());
    response
}

// =============================================================================
// Routes
// =============================================================================

#[tokio::test]
async fn healthz_returns_ok() {
    let addr = spawn_app().await;
    let response = get_raw(addr, "/healthz").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
}

#[tokio::test]
async fn root_serves_index_html() {
    let addr = spawn_app().await;
    let response = get_raw(addr, "/").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("text/html"));
    assert!(response.contains("WebEditor"));
}

#[tokio::test]
async fn unknown_file_is_not_found() {
    let addr = spawn_app().await;
    let response = get_raw(addr, "/missing.js").await;
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");
}
