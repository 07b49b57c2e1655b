pub mod acceptor;
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod http;
pub mod listing;
pub mod mime;
pub mod path;
pub mod pool;
pub mod server;
pub mod streamer;

/// Re-exports of common components for easier access
pub use acceptor::{ConnectionAcceptor, StopHandle};
pub use cli::Cli;
pub use config::ServerConfig;
pub use connection::Connection;
pub use error::{ServerError, ServerResult};
pub use http::{RequestLine, ResponseHead, Status};
pub use listing::DirectoryEntry;
pub use path::{resolve, url_decode, ResolvedPath};
pub use pool::WorkerPool;
pub use server::Server;
