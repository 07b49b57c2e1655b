//! Request target decoding and the traversal gate.
//!
//! Every filesystem path the server touches comes out of [`resolve`]. The gate
//! is a substring check on the decoded path (`..`, `//`, `\`), not a full
//! canonicalization. Decoded paths stay raw bytes, so names that are not
//! valid UTF-8 reach the filesystem unchanged.

use crate::error::{ServerError, ServerResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// URL prefix that turns a file request into an attachment download
pub const DOWNLOAD_PREFIX: &[u8] = b"/download/";

/// Path served for `/` and the empty target
pub const INDEX_PATH: &[u8] = b"/index.html";

/// A request target that passed the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Decoded URL path as the client sent it
    pub url_path: Vec<u8>,
    /// Location under the document root
    pub fs_path: PathBuf,
    /// Set for `/download/...` targets
    pub is_download: bool,
}

/// Percent-decode a request target and map `+` to a space.
///
/// A `%` not followed by two hex digits is kept as-is.
pub fn url_decode<T: AsRef<[u8]>>(input: T) -> Vec<u8> {
    let bytes = input.as_ref();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape = bytes
                    .get(i + 1..i + 3)
                    .and_then(|pair| Some((hex_value(pair[0])?, hex_value(pair[1])?)));
                match escape {
                    Some((high, low)) => {
                        decoded.push(high << 4 | low);
                        i += 3;
                    }
                    None => {
                        decoded.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            b => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    decoded
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// True when the decoded path contains `..`, `//` or a backslash
pub fn is_traversal(path: &[u8]) -> bool {
    path.windows(2).any(|pair| pair == b".." || pair == b"//") || path.contains(&b'\\')
}

/// Raw bytes of an OS string (lossy only where the platform is not byte-based)
pub fn os_bytes(name: &OsStr) -> Vec<u8> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        name.as_bytes().to_vec()
    }
    #[cfg(not(unix))]
    {
        name.to_string_lossy().into_owned().into_bytes()
    }
}

fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        PathBuf::from(OsStr::from_bytes(bytes))
    }
    #[cfg(not(unix))]
    {
        PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Decode `raw_target` and map it under `root`.
///
/// Returns [`ServerError::Forbidden`] before any filesystem access when the
/// decoded path fails the traversal check.
pub fn resolve<T: AsRef<[u8]>>(root: &Path, raw_target: T) -> ServerResult<ResolvedPath> {
    let url_path = url_decode(raw_target);

    if is_traversal(&url_path) {
        return Err(ServerError::Forbidden(
            String::from_utf8_lossy(&url_path).into_owned(),
        ));
    }

    if let Some(rest) = url_path.strip_prefix(DOWNLOAD_PREFIX) {
        let fs_path = join_under_root(root, rest);
        return Ok(ResolvedPath {
            url_path,
            fs_path,
            is_download: true,
        });
    }

    let url_path = if url_path.is_empty() || url_path == b"/" {
        INDEX_PATH.to_vec()
    } else {
        url_path
    };
    let fs_path = join_under_root(root, &url_path);

    Ok(ResolvedPath {
        url_path,
        fs_path,
        is_download: false,
    })
}

/// `Path::join` with an absolute argument would discard the root
fn join_under_root(root: &Path, url_path: &[u8]) -> PathBuf {
    let relative = url_path.strip_prefix(b"/").unwrap_or(url_path);
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(bytes_to_path(relative))
    }
}
