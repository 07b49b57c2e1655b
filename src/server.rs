use crate::acceptor::{ConnectionAcceptor, StopHandle};
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::pool::WorkerPool;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

/// The listening socket plus the pool that serves it
pub struct Server {
    config: Arc<ServerConfig>,
    acceptor: ConnectionAcceptor,
    pool: WorkerPool,
}

impl Server {
    /// Validate `config`, start the workers and bind the listener
    pub fn bind(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let acceptor = ConnectionAcceptor::new(config.socket_address())?;
        let pool = WorkerPool::new(config.worker_threads)?;

        Ok(Self {
            config: Arc::new(config),
            acceptor,
            pool,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.acceptor.local_addr()
    }

    /// Handle that ends [`run`](Self::run) from another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.acceptor.stop_handle()
    }

    /// Serve until stopped, then wait for in-flight connections to finish
    pub fn run(mut self) -> ServerResult<()> {
        info!("Server running on port {}", self.local_addr().port());
        info!("Web root directory: {}", self.config.root_dir.display());
        info!("Thread pool size: {}", self.pool.size());

        self.acceptor.run(&self.pool, &self.config);

        info!("Waiting for workers to finish");
        self.pool.shutdown();
        Ok(())
    }
}
