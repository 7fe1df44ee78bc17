//! Host HTTP collector client against a one-shot loopback server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use firesense::adapters::http_collector::HttpCollector;
use firesense::app::ports::CollectorPort;
use firesense::error::CommsError;

/// Accept one connection, capture the request, answer with `response`.
/// Returns the collector URL and a receiver for the captured request.
fn serve_once(response: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let mut raw = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = stream.read(&mut chunk).unwrap_or(0);
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if request_complete(&raw) {
                break;
            }
        }
        tx.send(String::from_utf8_lossy(&raw).into_owned()).unwrap();
        stream.write_all(response.as_bytes()).unwrap();
    });

    (format!("http://127.0.0.1:{port}/api/sensor-data"), rx)
}

fn request_complete(raw: &[u8]) -> bool {
    let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
    let length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    raw.len() >= end + 4 + length
}

#[test]
fn posts_json_and_reads_status() {
    let (url, rx) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n\
         {\"status\":\"ok\",\"risk_level\":\"LOW\",\"risk_code\":0}",
    );
    let mut client = HttpCollector::new(&url, 2_000).unwrap();
    let body = br#"{"device_id":"ESP32_001","temperature":30.0,"smoke":50,"gas":50,"risk_level":"LOW"}"#;

    let resp = client.post_json(body).unwrap();
    assert_eq!(resp.status, 200);
    assert!(resp.body.starts_with(b"{\"status\":\"ok\""));

    let request = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(request.starts_with("POST /api/sensor-data HTTP/1.1\r\n"));
    // Header name case is up to the client.
    let lower = request.to_ascii_lowercase();
    assert!(lower.contains("content-type: application/json\r\n"));
    assert!(lower.contains(&format!("content-length: {}\r\n", body.len())));
    assert!(request.ends_with(core::str::from_utf8(body).unwrap()));
}

#[test]
fn error_status_is_returned_not_raised() {
    let (url, _rx) = serve_once("HTTP/1.1 400 BAD REQUEST\r\n\r\n{\"error\":\"Missing field: gas\"}");
    let mut client = HttpCollector::new(&url, 2_000).unwrap();
    let resp = client.post_json(b"{}").unwrap();
    assert_eq!(resp.status, 400);
    assert!(!resp.is_success());
}

#[test]
fn garbage_reply_is_an_io_failure() {
    let (url, _rx) = serve_once("SSH-2.0-OpenSSH\r\n\r\n");
    let mut client = HttpCollector::new(&url, 2_000).unwrap();
    assert_eq!(client.post_json(b"{}"), Err(CommsError::HttpIo));
}

#[test]
fn closed_port_fails_to_connect() {
    // Bind then drop to get a port nobody is listening on.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let mut client = HttpCollector::new(&format!("http://127.0.0.1:{port}/api/sensor-data"), 500).unwrap();
    assert_eq!(client.post_json(b"{}"), Err(CommsError::HttpConnectFailed));
}

#[test]
fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_millis(600));
        drop(stream);
    });

    let mut client = HttpCollector::new(&format!("http://127.0.0.1:{port}/"), 200).unwrap();
    assert_eq!(client.post_json(b"{}"), Err(CommsError::HttpTimeout));
    handle.join().unwrap();
}

#[test]
fn rejects_unusable_urls() {
    assert!(matches!(HttpCollector::new("ftp://host/x", 1_000), Err(CommsError::InvalidUrl)));
    assert!(matches!(HttpCollector::new("http://:80/x", 1_000), Err(CommsError::InvalidUrl)));
}
