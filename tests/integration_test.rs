use lan_http::{Server, ServerConfig, StopHandle};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;

struct TestServer {
    addr: SocketAddr,
    stop: StopHandle,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start(root: &Path, workers: usize) -> Self {
        let config = ServerConfig::new()
            .with_port(0)
            .with_root_dir(root)
            .with_worker_threads(workers);
        let server = Server::bind(config).unwrap();
        let port = server.local_addr().port();
        let stop = server.stop_handle();
        let thread = thread::spawn(move || server.run().unwrap());

        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], port)),
            stop,
            thread: Some(thread),
        }
    }

    fn send(&self, request: &[u8]) -> Vec<u8> {
        let mut client = TcpStream::connect(self.addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client.write_all(request).unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        buf
    }

    fn get(&self, target: &str) -> (String, Vec<u8>) {
        let raw = self.send(format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target).as_bytes());
        let end = raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|p| p + 4)
            .unwrap_or(raw.len());
        (String::from_utf8_lossy(&raw[..end]).into_owned(), raw[end..].to_vec())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop.stop();
        if let Some(thread) = self.thread.take() {
            thread.join().unwrap();
        }
    }
}

fn site() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), b"hello world\n").unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();
    dir
}

#[test]
fn test_root_serves_index() {
    let dir = site();
    let server = TestServer::start(dir.path(), 2);

    let (head, body) = server.get("/");
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/html\r\n"));
    assert!(head.contains("Content-Length: 12\r\n"));
    assert!(head.contains("Connection: close\r\n"));
    assert!(head.contains(" GMT\r\n"));
    assert_eq!(body, b"hello world\n");
}

#[test]
fn test_traversal_is_forbidden() {
    let dir = site();
    let server = TestServer::start(dir.path(), 2);

    let (head, body) = server.get("/../etc/passwd");
    assert!(head.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    assert_eq!(body, b"Forbidden");
}

#[test]
fn test_empty_directory_redirect_and_listing() {
    let dir = site();
    let server = TestServer::start(dir.path(), 2);

    let (head, body) = server.get("/docs");
    assert!(head.starts_with("HTTP/1.1 301 Moved Permanently\r\n"));
    assert!(head.contains("Location: /docs/\r\n"));
    assert!(body.is_empty());

    let (head, body) = server.get("/docs/");
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/html\r\n"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Directory Listing: /docs/"));
    assert_eq!(html.matches("<li>").count(), 0);
}

#[test]
fn test_listing_has_one_entry_per_child() {
    let dir = site();
    fs::write(dir.path().join("docs/a.txt"), b"a").unwrap();
    fs::write(dir.path().join("docs/b.txt"), b"b").unwrap();
    fs::create_dir(dir.path().join("docs/img")).unwrap();
    let server = TestServer::start(dir.path(), 2);

    let (head, body) = server.get("/docs/");
    let html = String::from_utf8(body).unwrap();
    assert!(head.contains(&format!("Content-Length: {}\r\n", html.len())));
    assert_eq!(html.matches("<li>").count(), 3);
    for link in ["/docs/a.txt", "/docs/b.txt", "/docs/img/", "/download/docs/a.txt"] {
        assert!(html.contains(&format!("href=\"{}\"", link)), "missing {}", link);
    }
}

#[test]
fn test_method_not_allowed_and_missing_file() {
    let dir = site();
    let server = TestServer::start(dir.path(), 2);

    let raw = server.send(b"POST /index.html HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
    let text = String::from_utf8_lossy(&raw);
    assert!(text.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(text.ends_with("Method Not Allowed"));

    let (head, body) = server.get("/nope.txt");
    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(body, b"File Not Found");
}

#[test]
fn test_download_endpoint() {
    let dir = site();
    fs::write(dir.path().join("docs/plan v2.txt"), b"plan").unwrap();
    let server = TestServer::start(dir.path(), 2);

    let (head, body) = server.get("/download/docs/plan%20v2.txt");
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: application/octet-stream\r\n"));
    assert!(head.contains(
        "Content-Disposition: attachment; filename=\"plan v2.txt\"; filename*=UTF-8''plan%20v2.txt\r\n"
    ));
    assert_eq!(body, b"plan");
}

#[test]
fn test_silent_client_is_closed_without_response() {
    let dir = site();
    let server = TestServer::start(dir.path(), 1);

    // Connect and half-close without sending anything
    let mut client = TcpStream::connect(server.addr).unwrap();
    client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    client.shutdown(std::net::Shutdown::Write).unwrap();
    let mut buf = Vec::new();
    client.read_to_end(&mut buf).unwrap();
    assert!(buf.is_empty());

    // The single worker is still available
    let (head, _) = server.get("/");
    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[test]
fn test_parallel_clients() {
    let dir = site();
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 256) as u8).collect();
    fs::write(dir.path().join("big.bin"), &payload).unwrap();
    let server = TestServer::start(dir.path(), 4);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let addr = server.addr;
            thread::spawn(move || {
                let mut client = TcpStream::connect(addr).unwrap();
                client.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
                client.write_all(b"GET /big.bin HTTP/1.1\r\n\r\n").unwrap();
                let mut buf = Vec::new();
                client.read_to_end(&mut buf).unwrap();
                buf
            })
        })
        .collect();

    for handle in handles {
        let raw = handle.join().unwrap();
        let end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        let head = String::from_utf8_lossy(&raw[..end]);
        assert!(head.contains("Content-Length: 100000\r\n"));
        assert_eq!(&raw[end..], &payload[..]);
    }
}

#[test]
fn test_bind_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::new()
        .with_port(0)
        .with_root_dir(dir.path().join("missing"));
    assert!(Server::bind(config).is_err());
}
