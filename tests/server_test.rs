//! Tests de integración para el servidor
//! tests/server_test.rs
//!
//! Cada test levanta un `Server` real en 127.0.0.1 con puerto efímero y lo
//! detiene con su `Shutdown` al terminar.

use pool_server::commands::site_router;
use pool_server::config::Config;
use pool_server::server::{Server, Shutdown};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown as SocketShutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Servidor corriendo en un thread aparte
struct TestServer {
    addr: SocketAddr,
    shutdown: Shutdown,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start(workers: usize, queue_capacity: usize, idle_timeout_secs: u64) -> Self {
        let config = Config {
            host: Some("127.0.0.1".to_string()),
            port: "0".to_string(),
            workers,
            queue_capacity,
            idle_timeout_secs,
            ..Config::default()
        };

        let handler = Arc::new(site_router(&config.static_dir));
        let server = Server::bind(&config, handler, Shutdown::new()).expect("bind");
        let addr = server.local_addr();
        let shutdown = server.shutdown_handle();
        let thread = thread::spawn(move || server.run());

        Self {
            addr,
            shutdown,
            thread: Some(thread),
        }
    }

    fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).expect("connect");
        stream.set_read_timeout(Some(CLIENT_TIMEOUT)).unwrap();
        stream.set_write_timeout(Some(CLIENT_TIMEOUT)).unwrap();
        stream
    }

    fn stop(&mut self) {
        self.shutdown.trigger();
        if let Some(thread) = self.thread.take() {
            thread.join().expect("server thread panicked");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if !thread::panicking() {
            self.stop();
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Lee exactamente una respuesta (headers + Content-Length bytes)
fn read_response(stream: &mut TcpStream) -> io::Result<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).into_owned();
            let total = end + 4 + content_length(&head);
            if buf.len() >= total {
                return Ok(String::from_utf8_lossy(&buf[..total]).into_owned());
            }
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(io::Error::from(ErrorKind::UnexpectedEof));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn send(stream: &mut TcpStream, request: &str) -> String {
    stream.write_all(request.as_bytes()).expect("write request");
    read_response(stream).expect("read response")
}

fn body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    let prefix = format!("{}: ", name);
    response
        .split("\r\n")
        .take_while(|line| !line.is_empty())
        .find_map(|line| line.strip_prefix(prefix.as_str()))
}

#[test]
fn test_info_endpoint() {
    let server = TestServer::start(2, 16, 2);
    let mut client = server.connect();

    let response = send(&mut client, "GET /info HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
    assert_eq!(header(&response, "Content-Type"), Some("application/json"));
    assert_eq!(header(&response, "Connection"), Some("keep-alive"));

    let json: serde_json::Value = serde_json::from_str(body(&response)).expect("valid JSON");
    assert!(json["purpose"].is_string());
    assert!(json["experience"].is_string());
    assert!(json["learning"].is_string());
}

#[test]
fn test_keep_alive_serves_many_requests() {
    let server = TestServer::start(1, 16, 3);
    let mut client = server.connect();

    for _ in 0..5 {
        let response = send(&mut client, "GET /info HTTP/1.1\r\n\r\n");
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert_eq!(header(&response, "Keep-Alive"), Some("timeout=3, max=100"));
    }
}

#[test]
fn test_unknown_route_is_404() {
    let server = TestServer::start(1, 16, 2);
    let mut client = server.connect();

    let response = send(&mut client, "GET /nope HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"), "got: {}", response);
    assert_eq!(body(&response), "<h1>404 Not Found</h1>");
}

#[test]
fn test_login_then_dashboard() {
    let server = TestServer::start(2, 16, 2);
    let mut client = server.connect();

    let login = send(&mut client, "POST /login HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
    assert!(login.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", login);
    let cookie = header(&login, "Set-Cookie")
        .and_then(|value| value.split(';').next())
        .expect("Set-Cookie header");

    let request = format!("GET /dashboard HTTP/1.1\r\nCookie: {}\r\n\r\n", cookie);
    let dashboard = send(&mut client, &request);
    assert!(dashboard.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", dashboard);
    assert!(body(&dashboard).contains("Admin Dashboard"));
}

#[test]
fn test_dashboard_without_cookie_is_forbidden() {
    let server = TestServer::start(1, 16, 2);
    let mut client = server.connect();

    let response = send(&mut client, "GET /dashboard HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 403 Forbidden\r\n"), "got: {}", response);

    let response = send(&mut client, "GET /logout HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 403 Forbidden\r\n"));
}

#[test]
fn test_full_queue_answers_503() {
    // 1 worker + 1 lugar en la cola
    let server = TestServer::start(1, 1, 2);

    // A ocupa al único worker y queda en keep-alive
    let mut a = server.connect();
    let response = send(&mut a, "GET /info HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    // B llena la cola
    let mut b = server.connect();
    thread::sleep(Duration::from_millis(200));

    // C no cabe
    let mut c = server.connect();
    let mut rejected = String::new();
    c.read_to_string(&mut rejected).expect("read 503");
    assert!(rejected.starts_with("HTTP/1.1 503 Service Unavailable\r\n"), "got: {}", rejected);
    assert_eq!(header(&rejected, "Connection"), Some("close"));
    assert_eq!(body(&rejected), "Server is too busy. Try again later.");

    // B se atiende cuando A vence por idle timeout
    let response = send(&mut b, "GET /info HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
}

#[test]
fn test_shutdown_drains_queued_connections() {
    let mut server = TestServer::start(1, 4, 1);

    let mut a = server.connect();
    let response = send(&mut a, "GET /info HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    // B queda encolada detrás de A con su request ya enviado
    let mut b = server.connect();
    b.write_all(b"GET /info HTTP/1.1\r\n\r\n").unwrap();
    b.shutdown(SocketShutdown::Write).unwrap();
    thread::sleep(Duration::from_millis(200));

    let addr = server.addr;
    server.stop();

    let response = read_response(&mut b).expect("queued connection answered");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);

    // El listener ya está cerrado
    assert!(TcpStream::connect(addr).is_err());
}
