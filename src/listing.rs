use crate::http::{self, Status};
use crate::path::os_bytes;
use crate::streamer::percent_encode;
use log::warn;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Raw name bytes, as the filesystem stores them
    pub name: Vec<u8>,
    pub is_dir: bool,
}

impl DirectoryEntry {
    /// Name for display in the page
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Read the direct children of `dir` in filesystem order.
///
/// An unreadable directory gives an empty list; entries whose status cannot
/// be read are skipped.
pub fn read_entries(dir: &Path) -> Vec<DirectoryEntry> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut listing = Vec::new();
    for entry in entries.flatten() {
        let name = os_bytes(&entry.file_name());
        if name == b"." || name == b".." {
            continue;
        }
        // Follows symlinks, so a link to a directory lists as one
        match fs::metadata(entry.path()) {
            Ok(metadata) => listing.push(DirectoryEntry {
                name,
                is_dir: metadata.is_dir(),
            }),
            Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
        }
    }
    listing
}

/// Escape text for an HTML body or attribute
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a decoded URL path segment by segment, keeping the slashes
pub fn encode_href(path: &[u8]) -> String {
    path.split(|&b| b == b'/')
        .map(percent_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Render the HTML index for `url_path`, which must end in `/`
pub fn render(url_path: &[u8], entries: &[DirectoryEntry]) -> String {
    let mut html = String::new();
    html.push_str("<html><head><title>Directory Listing</title>");
    html.push_str("<style>");
    html.push_str("body { font-family: Arial, sans-serif; margin: 20px; }");
    html.push_str("h1 { color: #333; }");
    html.push_str("ul { list-style-type: none; padding: 0; }");
    html.push_str("li { margin: 5px 0; }");
    html.push_str("a { text-decoration: none; color: #0066cc; }");
    html.push_str("a:hover { text-decoration: underline; }");
    html.push_str("</style></head>");
    html.push_str(&format!(
        "<body><h1>Directory Listing: {}</h1><ul>",
        escape_html(&String::from_utf8_lossy(url_path))
    ));

    for entry in entries {
        let item_path = [url_path, &entry.name[..]].concat();
        let name = escape_html(&entry.display_name());
        if entry.is_dir {
            html.push_str(&format!(
                "<li><a href=\"{}/\">{}/</a></li>",
                encode_href(&item_path),
                name
            ));
        } else {
            html.push_str(&format!(
                "<li><a href=\"{href}\">{name}</a> (<a href=\"/download{href}\">Download</a>)</li>",
                href = encode_href(&item_path),
                name = name
            ));
        }
    }

    html.push_str("</ul></body></html>");
    html
}

/// Answer a request that resolved to the directory `dir`.
///
/// Without a trailing slash the client is redirected to `url_path + "/"`,
/// re-encoded so the `Location` header stays printable ASCII.
pub fn send_listing<W: Write>(writer: &mut W, url_path: &[u8], dir: &Path) -> io::Result<Status> {
    if !url_path.ends_with(b"/") {
        let location = encode_href(&[url_path, &b"/"[..]].concat());
        http::send_redirect(writer, &location)?;
        return Ok(Status::MovedPermanently);
    }

    let entries = read_entries(dir);
    let html = render(url_path, &entries);
    http::send_response(writer, Status::Ok, "text/html", html.as_bytes())?;
    Ok(Status::Ok)
}
