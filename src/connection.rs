use crate::http::RequestLine;
use log::warn;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// An accepted client connection.
///
/// Owned by one task at a time; the socket is closed when the value is
/// closed or dropped, so every exit path releases it exactly once.
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    id: usize,
}

impl Connection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, id: usize) -> Self {
        Self {
            stream,
            peer_addr,
            id,
        }
    }

    /// Look at the pending request without consuming it and return its target.
    ///
    /// Waits at most `timeout` for bytes to arrive; a zero timeout skips the
    /// peek entirely.
    pub fn peek_target(&self, buffer_size: usize, timeout: Duration) -> Option<String> {
        if timeout.is_zero() {
            return None;
        }

        let mut buffer = vec![0u8; buffer_size];
        self.stream.set_read_timeout(Some(timeout)).ok()?;
        let peeked = self.stream.peek(&mut buffer);
        // Worker reads block without a deadline
        if let Err(e) = self.stream.set_read_timeout(None) {
            warn!("Could not clear peek timeout for {}: {}", self.peer_addr, e);
        }

        match peeked {
            Ok(n) if n > 0 => RequestLine::parse(&buffer[..n]).map(|line| line.target_lossy()),
            _ => None,
        }
    }

    /// Read up to one buffer's worth of the request with a single read
    pub fn read_request(&mut self, buffer_size: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; buffer_size];
        let n = loop {
            match self.stream.read(&mut buffer) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                result => break result?,
            }
        };
        buffer.truncate(n);
        Ok(buffer)
    }

    /// Shut down both directions and release the socket
    pub fn close(self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Both)
    }

    /// Get the connection's peer address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Get the connection's unique ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl Write for Connection {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
