use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::handler;
use crate::pool::WorkerPool;
use log::{error, info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[cfg(unix)]
const BACKLOG: i32 = libc::SOMAXCONN;
#[cfg(not(unix))]
const BACKLOG: i32 = i32::MAX;

/// Owns the listening socket and hands each accepted connection to the pool
pub struct ConnectionAcceptor {
    listener: TcpListener,
    local_addr: SocketAddr,
    connection_count: AtomicUsize,
    running: Arc<AtomicBool>,
}

/// Stops a running acceptor from another thread
#[derive(Clone, Debug)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl StopHandle {
    /// Clear the running flag and unblock `accept()`
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            // The loop re-checks the flag once this connection is accepted
            if let Err(e) = TcpStream::connect(self.wake_addr) {
                warn!("Could not wake acceptor: {}", e);
            }
        }
    }
}

impl ConnectionAcceptor {
    /// Create a new connection acceptor bound to the specified address
    pub fn new<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket_addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "No socket addresses found")
        })?;

        let socket = Self::create_socket(&socket_addr)?;
        let listener: TcpListener = socket.into();
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            connection_count: AtomicUsize::new(0),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Accept a new connection
    pub fn accept(&self) -> io::Result<Connection> {
        let (stream, addr) = self.listener.accept()?;
        let id = self.connection_count.fetch_add(1, Ordering::Relaxed);
        Ok(Connection::new(stream, addr, id))
    }

    /// Get the local address this acceptor is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.connection_count.load(Ordering::Relaxed)
    }

    /// Handle for stopping [`run`](Self::run) from another thread
    pub fn stop_handle(&self) -> StopHandle {
        let mut wake_addr = self.local_addr;
        if wake_addr.ip().is_unspecified() {
            wake_addr.set_ip(Ipv4Addr::LOCALHOST.into());
        }
        StopHandle {
            running: Arc::clone(&self.running),
            wake_addr,
        }
    }

    /// Accept connections until stopped, submitting one task per connection.
    ///
    /// A failed accept is logged and the loop keeps going.
    pub fn run(&self, pool: &WorkerPool, config: &Arc<ServerConfig>) {
        while self.running.load(Ordering::SeqCst) {
            let conn = match self.accept() {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Accept failed: {}", e);
                    continue;
                }
            };

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            match conn.peek_target(config.buffer_size, config.peek_timeout) {
                Some(target) => info!("New connection from: {} To: {}", conn.peer_addr().ip(), target),
                None => info!("New connection from: {}", conn.peer_addr().ip()),
            }

            let task_config = Arc::clone(config);
            if let Err(e) = pool.submit(move || handler::handle_connection(conn, &task_config)) {
                error!("Could not queue connection: {}", e);
            }
        }
        info!("Acceptor stopped after {} connections", self.connection_count());
    }

    /// Create a properly configured socket
    fn create_socket(addr: &SocketAddr) -> io::Result<Socket> {
        let domain = if addr.is_ipv6() {
            Domain::IPV6
        } else {
            Domain::IPV4
        };

        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;

        let sock_addr = socket2::SockAddr::from(*addr);
        socket.bind(&sock_addr)?;

        // The kernel clamps this to its own maximum
        socket.listen(BACKLOG)?;

        Ok(socket)
    }
}
