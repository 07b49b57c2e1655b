use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::ServerError;
use crate::http::{self, RequestLine, Status};
use crate::listing;
use crate::mime::{self, DEFAULT_CONTENT_TYPE};
use crate::path;
use crate::streamer::{self, StreamOutcome};
use log::{debug, error, warn};
use std::io::{self, Write};
use std::path::Path;

/// How a request was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing usable was read; closed without a response
    Dropped,
    Responded(Status),
}

/// Handle one accepted connection and close it.
///
/// Errors stay inside this call: they are logged and the connection is
/// released either way.
pub fn handle_connection(mut conn: Connection, config: &ServerConfig) {
    let peer = conn.peer_addr();
    let id = conn.id();

    let request = match conn.read_request(config.buffer_size) {
        Ok(request) => request,
        Err(e) => {
            error!("Read from {} (#{}) failed: {}", peer, id, e);
            return;
        }
    };

    match respond(&mut conn, &request, &config.root_dir) {
        Ok(outcome) => debug!("#{} {} -> {:?}", id, peer, outcome),
        Err(e) => error!("Write to {} (#{}) failed: {}", peer, id, e),
    }

    if let Err(e) = conn.close() {
        // Peer already gone
        debug!("Closing #{} {}: {}", id, peer, e);
    }
}

/// Answer the request held in `request` on `writer`
pub fn respond<W: Write>(writer: &mut W, request: &[u8], root: &Path) -> io::Result<Outcome> {
    let line = match RequestLine::parse(request) {
        Some(line) => line,
        None => return Ok(Outcome::Dropped),
    };

    if !line.is_get() {
        http::send_text(writer, Status::MethodNotAllowed, "Method Not Allowed")?;
        return Ok(Outcome::Responded(Status::MethodNotAllowed));
    }

    let resolved = match path::resolve(root, &line.target) {
        Ok(resolved) => resolved,
        Err(ServerError::Forbidden(decoded)) => {
            warn!("Forbidden path: {}", decoded);
            http::send_text(writer, Status::Forbidden, "Forbidden")?;
            return Ok(Outcome::Responded(Status::Forbidden));
        }
        Err(e) => return Err(io::Error::new(io::ErrorKind::Other, e.to_string())),
    };

    if resolved.is_download {
        let outcome = streamer::send_file(writer, &resolved.fs_path, DEFAULT_CONTENT_TYPE, true)?;
        return Ok(stream_status(outcome));
    }

    if resolved.fs_path.is_dir() {
        let status = listing::send_listing(writer, &resolved.url_path, &resolved.fs_path)?;
        return Ok(Outcome::Responded(status));
    }

    let content_type = mime::content_type_for(&resolved.fs_path);
    let outcome = streamer::send_file(writer, &resolved.fs_path, content_type, false)?;
    Ok(stream_status(outcome))
}

fn stream_status(outcome: StreamOutcome) -> Outcome {
    match outcome {
        StreamOutcome::Sent(_) => Outcome::Responded(Status::Ok),
        StreamOutcome::NotFound => Outcome::Responded(Status::NotFound),
    }
}
