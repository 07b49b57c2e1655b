use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    // Network configuration
    pub port: u16,

    /// Directory every request path is resolved against
    pub root_dir: PathBuf,

    // Thread configuration
    pub worker_threads: usize,

    /// Size of the single read buffer used for a request
    pub buffer_size: usize,

    /// How long the acceptor waits for request bytes to log the target.
    /// Zero disables the peek.
    pub peek_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            root_dir: PathBuf::from("."),
            worker_threads: 4,
            buffer_size: 4096,
            peek_timeout: Duration::from_millis(200),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the port to listen on
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the document root
    pub fn with_root_dir<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root_dir = normalize_root(root.as_ref());
        self
    }

    /// Set the number of worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Set the request buffer size
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the acceptor peek timeout
    pub fn with_peek_timeout(mut self, timeout: Duration) -> Self {
        self.peek_timeout = timeout;
        self
    }

    /// Address the listener binds to (all interfaces)
    pub fn socket_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Check the values before the server starts
    pub fn validate(&self) -> ServerResult<()> {
        if self.worker_threads == 0 {
            return Err(ServerError::Config("worker_threads must be >= 1".to_string()));
        }
        if self.buffer_size < 16 {
            return Err(ServerError::Config("buffer_size must be >= 16 bytes".to_string()));
        }
        if !self.root_dir.is_dir() {
            return Err(ServerError::Config(format!(
                "document root {} is not a directory",
                self.root_dir.display()
            )));
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ServerResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        config.root_dir = normalize_root(&config.root_dir);
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_json_file<P: AsRef<Path>>(&self, path: P) -> ServerResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Strip trailing separators so `www/` and `www` name the same root
fn normalize_root(root: &Path) -> PathBuf {
    let raw = root.to_string_lossy();
    let trimmed = raw.trim_end_matches(|c| c == '/' || c == '\\');
    if trimmed.is_empty() {
        // "/" alone must stay the filesystem root
        return root.to_path_buf();
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.socket_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_root_trailing_separator_is_trimmed() {
        let config = ServerConfig::new().with_root_dir("www/");
        assert_eq!(config.root_dir, PathBuf::from("www"));

        let config = ServerConfig::new().with_root_dir("/");
        assert_eq!(config.root_dir, PathBuf::from("/"));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new()
            .with_root_dir(dir.path())
            .with_worker_threads(0);
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new().with_root_dir(dir.path().join("nope"));
        assert!(config.validate().is_err());

        let config = ServerConfig::new().with_root_dir(dir.path());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_and_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");

        let config = ServerConfig::new().with_port(9000).with_worker_threads(2);
        config.save_to_json_file(&path).unwrap();
        let loaded = ServerConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.port, 9000);
        assert_eq!(loaded.worker_threads, 2);

        // Missing fields fall back to defaults
        fs::write(&path, r#"{ "port": 1234, "root_dir": "site/" }"#).unwrap();
        let loaded = ServerConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded.port, 1234);
        assert_eq!(loaded.root_dir, PathBuf::from("site"));
        assert_eq!(loaded.worker_threads, 4);
    }
}
