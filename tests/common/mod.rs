#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use webman::config::Config;
use webman::server::listener::serve;
use webman::server::ServerContext;
use webman::telemetry::{DiskUsage, TelemetryProvider};

/// Fixed figures so sysinfo output is predictable.
pub struct FakeTelemetry;

impl TelemetryProvider for FakeTelemetry {
    fn disk_usage(&self, mount: &Path) -> Option<DiskUsage> {
        if mount.ends_with("missing") {
            None
        } else {
            Some(DiskUsage { total: 1000, used: 400, free: 600 })
        }
    }

    fn hostname(&self) -> Option<String> {
        Some("testhost".to_string())
    }

    fn ipv4_address(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::new(192, 168, 0, 42))
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub ctx: ServerContext,
    pub dir: TempDir,
}

impl TestServer {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Absolute path of `name`, percent-encoded for a query string.
    pub fn encoded(&self, name: &str) -> String {
        encode(&self.path(name).to_string_lossy())
    }

    pub async fn get(&self, target: &str) -> RawResponse {
        send(self.addr, get_request(target).as_bytes()).await
    }

    pub async fn send(&self, raw: &[u8]) -> RawResponse {
        send(self.addr, raw).await
    }
}

pub fn test_config(dir: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.server.listen_addr = "127.0.0.1:0".to_string();
    cfg.server.close_grace_ms = 0;
    cfg.storage.default_dir = dir.to_path_buf();
    cfg.storage.data_mount = dir.to_path_buf();
    cfg.storage.system_mount = PathBuf::from("/system/missing");
    cfg
}

pub async fn start() -> TestServer {
    start_with(|_| {}).await
}

pub async fn start_with(tweak: impl FnOnce(&mut Config)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = test_config(dir.path());
    tweak(&mut cfg);

    let ctx = ServerContext::with_telemetry(cfg, Arc::new(FakeTelemetry));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, ctx.clone()));

    TestServer { addr, ctx, dir }
}

pub fn encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

pub fn get_request(target: &str) -> String {
    format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target)
}

pub const BOUNDARY: &str = "----WebKitFormBoundary7MA4YWxkTrZu0gW";

pub fn multipart_body(boundary: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            boundary, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

pub fn upload_request(target: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let body = multipart_body(BOUNDARY, filename, data);
    let mut req = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\n\
         Content-Type: multipart/form-data; boundary={}\r\n\
         Content-Length: {}\r\n\r\n",
        target,
        BOUNDARY,
        body.len()
    )
    .into_bytes();
    req.extend_from_slice(&body);
    req
}

/// Deterministic binary payload covering every byte value.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + i / 251) as u8).collect()
}

#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

pub async fn send(addr: SocketAddr, raw: &[u8]) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    parse_response(&buf)
}

pub fn parse_response(buf: &[u8]) -> RawResponse {
    let end = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has a header terminator");
    let head = std::str::from_utf8(&buf[..end]).unwrap();
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap();
    let status = status_line.split_whitespace().nth(1).unwrap().parse().unwrap();

    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    RawResponse {
        status,
        headers,
        body: buf[end + 4..].to_vec(),
    }
}
