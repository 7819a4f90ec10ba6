mod common;

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use webman::http::connection::{body_target, Connection};
use webman::server::ServerContext;

fn context(max_body: usize) -> ServerContext {
    let dir = std::env::temp_dir();
    let mut cfg = common::test_config(&dir);
    cfg.server.max_body_bytes = max_body;
    ServerContext::with_telemetry(cfg, Arc::new(common::FakeTelemetry))
}

#[test]
fn test_body_target_for_post_with_length() {
    let head = b"POST /api/upload HTTP/1.1\r\nContent-Length: 10\r\n\r\n";
    assert_eq!(body_target(head, 1024), Some(head.len() + 10));
}

#[test]
fn test_body_target_ignores_get() {
    let head = b"GET /api/list HTTP/1.1\r\nContent-Length: 10\r\n\r\n";
    assert_eq!(body_target(head, 1024), None);
}

#[test]
fn test_body_target_respects_bounds() {
    let zero = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";
    assert_eq!(body_target(zero, 1024), None);

    let at_limit = b"POST / HTTP/1.1\r\nContent-Length: 1024\r\n\r\n";
    assert_eq!(body_target(at_limit, 1024), None);

    let missing = b"POST / HTTP/1.1\r\nHost: x\r\n\r\n";
    assert_eq!(body_target(missing, 1024), None);
}

#[tokio::test]
async fn test_reader_accumulates_body_sent_in_pieces() {
    let (mut client, server) = tokio::io::duplex(64);
    let mut conn = Connection::new(server, context(1024));

    let writer = tokio::spawn(async move {
        client
            .write_all(b"POST /api/upload HTTP/1.1\r\nContent-Length: 300\r\n\r\n")
            .await
            .unwrap();
        for _ in 0..3 {
            client.write_all(&[b'z'; 100]).await.unwrap();
        }
        client
    });

    let raw = conn.read_request().await.unwrap().unwrap();
    let head_len = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    assert_eq!(raw.len(), head_len + 300);
    assert!(raw[head_len..].iter().all(|&b| b == b'z'));
    drop(writer.await.unwrap());
}

#[tokio::test]
async fn test_reader_returns_short_body_when_peer_closes() {
    let (mut client, server) = tokio::io::duplex(4096);
    let mut conn = Connection::new(server, context(1024));

    client
        .write_all(b"POST /api/upload HTTP/1.1\r\nContent-Length: 500\r\n\r\nonly-this")
        .await
        .unwrap();
    drop(client);

    let raw = conn.read_request().await.unwrap().unwrap();
    assert!(raw.ends_with(b"\r\n\r\nonly-this"));
}

#[tokio::test]
async fn test_reader_does_not_wait_for_oversized_body() {
    let (mut client, server) = tokio::io::duplex(4096);
    let mut conn = Connection::new(server, context(16));

    client
        .write_all(b"POST /api/upload HTTP/1.1\r\nContent-Length: 100\r\n\r\nabc")
        .await
        .unwrap();

    // The client keeps the stream open; the reader must still return.
    let raw = conn.read_request().await.unwrap().unwrap();
    assert!(raw.ends_with(b"abc"));
    drop(client);
}

#[tokio::test]
async fn test_reader_waits_for_split_headers() {
    let (mut client, server) = tokio::io::duplex(4096);
    let mut conn = Connection::new(server, context(1024));

    let writer = tokio::spawn(async move {
        client.write_all(b"GET /api/sysinfo HTTP/1.1\r\n").await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(b"Host: x\r\n\r\n").await.unwrap();
        client
    });

    let raw = conn.read_request().await.unwrap().unwrap();
    assert!(raw.ends_with(b"Host: x\r\n\r\n"));
    drop(writer.await.unwrap());
}

#[tokio::test]
async fn test_empty_connection_yields_nothing() {
    let (client, server) = tokio::io::duplex(64);
    drop(client);
    let mut conn = Connection::new(server, context(1024));

    assert!(conn.read_request().await.unwrap().is_none());
}

#[tokio::test]
async fn test_run_answers_and_finishes() {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let mut conn = Connection::new(server, context(1024));

    client
        .write_all(common::get_request("/unknown").as_bytes())
        .await
        .unwrap();

    conn.run().await.unwrap();
    conn.close(std::time::Duration::ZERO).await;

    let mut buf = Vec::new();
    client.read_to_end(&mut buf).await.unwrap();
    let res = common::parse_response(&buf);
    assert_eq!(res.status, 404);
}
