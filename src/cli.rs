use crate::config::ServerConfig;
use crate::error::ServerResult;
use clap::Parser;
use std::path::PathBuf;

/// Command-line interface of the file server
#[derive(Debug, Clone, Parser)]
#[command(name = "lan-http")]
#[command(about = "Serve a directory over HTTP on the local network")]
#[command(version)]
pub struct Cli {
    /// Port to listen on (default: 8080)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Web root directory (default: .)
    #[arg(short = 'w', long = "www", value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// Number of worker threads (default: 4)
    #[arg(short = 't', long = "threads")]
    pub worker_threads: Option<usize>,

    /// Load settings from a JSON file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to a JSON file and exit
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

impl Cli {
    /// Build the effective configuration: JSON file first, then flags
    pub fn to_config(&self) -> ServerResult<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_json_file(path)?,
            None => ServerConfig::new(),
        };

        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(root) = &self.root_dir {
            config = config.with_root_dir(root);
        }
        if let Some(threads) = self.worker_threads {
            config = config.with_worker_threads(threads);
        }

        Ok(config)
    }
}
