use chrono::Utc;
use std::io::{self, Write};

/// Format of the `Date` header
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// HTTP Status Codes the server can send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 200,
    MovedPermanently = 301,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
}

impl Status {
    /// Get the text description for this status code
    pub fn as_str(&self) -> &'static str {
        match *self {
            Status::Ok => "OK",
            Status::MovedPermanently => "Moved Permanently",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }
}

/// First line of a request: method and raw (still encoded) target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    /// Raw bytes, so targets that are not UTF-8 survive until decoding
    pub target: Vec<u8>,
}

impl RequestLine {
    /// Parse the request line out of one buffer's worth of bytes.
    ///
    /// The line ends at the first `\r\n` or at the end of the buffer. Returns
    /// `None` when it does not hold two space-separated tokens.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let end = data
            .windows(2)
            .position(|w| w == b"\r\n")
            .unwrap_or(data.len());
        let line = &data[..end];

        let method_end = line.iter().position(|&b| b == b' ')?;
        let (method, rest) = (&line[..method_end], &line[method_end + 1..]);
        let target = match rest.iter().position(|&b| b == b' ') {
            Some(target_end) => &rest[..target_end],
            None => rest,
        };

        if method.is_empty() || target.is_empty() {
            return None;
        }

        Some(Self {
            method: String::from_utf8_lossy(method).into_owned(),
            target: target.to_vec(),
        })
    }

    /// Target for log lines
    pub fn target_lossy(&self) -> String {
        String::from_utf8_lossy(&self.target).into_owned()
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// Current time as an HTTP `Date` value
pub fn http_date() -> String {
    Utc::now().format(HTTP_DATE_FORMAT).to_string()
}

/// Status line plus headers, written before any body bytes
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: Status,
    headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// Create a head with no headers yet
    pub fn new(status: Status) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Head carrying the headers every full response has:
    /// `Content-Type`, `Content-Length`, `Connection: close` and `Date`
    pub fn with_body_headers(status: Status, content_type: &str, content_length: u64) -> Self {
        Self::new(status)
            .header("Content-Type", content_type)
            .header("Content-Length", &content_length.to_string())
            .header("Connection", "close")
            .header("Date", &http_date())
    }

    /// Append a header
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serialize the head, including the blank line that ends it
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status.code(), self.status.as_str());
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
        out.push_str("\r\n");
        out.into_bytes()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

/// Send a complete response with an in-memory body
pub fn send_response<W: Write>(
    writer: &mut W,
    status: Status,
    content_type: &str,
    body: &[u8],
) -> io::Result<()> {
    let head = ResponseHead::with_body_headers(status, content_type, body.len() as u64);
    let mut response = head.to_bytes();
    response.extend_from_slice(body);
    writer.write_all(&response)?;
    writer.flush()
}

/// Send a plain-text response
pub fn send_text<W: Write>(writer: &mut W, status: Status, message: &str) -> io::Result<()> {
    send_response(writer, status, "text/plain", message.as_bytes())
}

/// Send the bare 301 used to add a trailing slash to directory URLs
pub fn send_redirect<W: Write>(writer: &mut W, location: &str) -> io::Result<()> {
    let head = ResponseHead::new(Status::MovedPermanently).header("Location", location);
    head.write_to(writer)?;
    writer.flush()
}
