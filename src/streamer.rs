use crate::http::{self, ResponseHead, Status};
use crate::path::os_bytes;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Bytes read from the file per write to the socket
pub const CHUNK_SIZE: usize = 4096;

/// What happened when a file was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// 200 sent, with this many body bytes
    Sent(u64),
    /// 404 sent
    NotFound,
}

/// Percent-encode every byte outside `[A-Za-z0-9._~-]`
pub fn percent_encode<T: AsRef<[u8]>>(value: T) -> String {
    let value = value.as_ref();
    let mut out = String::with_capacity(value.len());
    for &b in value {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// `Content-Disposition` value with an ASCII fallback and an RFC 5987 name.
///
/// The encoded name carries the raw bytes, whatever their charset.
pub fn content_disposition(filename: &[u8]) -> String {
    let fallback: String = String::from_utf8_lossy(filename)
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        percent_encode(filename)
    )
}

/// Send `path` as the response body, or a 404 when it cannot be opened.
///
/// `Content-Length` is taken from the file's metadata and exactly that many
/// bytes are written after the head.
pub fn send_file<W: Write>(
    writer: &mut W,
    path: &Path,
    content_type: &str,
    download: bool,
) -> io::Result<StreamOutcome> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Cannot open {}: {}", path.display(), e);
            http::send_text(writer, Status::NotFound, "File Not Found")?;
            return Ok(StreamOutcome::NotFound);
        }
    };

    let metadata = file.metadata()?;
    if !metadata.is_file() {
        warn!("Not a regular file: {}", path.display());
        http::send_text(writer, Status::NotFound, "File Not Found")?;
        return Ok(StreamOutcome::NotFound);
    }
    let size = metadata.len();

    let mut head = ResponseHead::with_body_headers(Status::Ok, content_type, size);
    if download {
        let filename = path.file_name().map(os_bytes).unwrap_or_default();
        head = head.header("Content-Disposition", &content_disposition(&filename));
    }
    head.write_to(writer)?;

    // Never write more than announced, even if the file grew meanwhile
    let mut body = file.take(size);
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut sent = 0u64;
    loop {
        let n = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        sent += n as u64;
    }
    writer.flush()?;

    if sent != size {
        warn!(
            "{} shrank while sending: {} of {} bytes written",
            path.display(),
            sent,
            size
        );
    }
    debug!("Sent {} ({} bytes)", path.display(), sent);

    Ok(StreamOutcome::Sent(sent))
}
