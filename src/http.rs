//! Just enough HTTP/1.1 to read a request head and write a buffered response.

use log::debug;
use std::fmt;
use std::io::{self, BufRead, Read, Write};

use crate::error::ServeError;

const MAX_LINE: usize = 65536;
const MAX_HEADERS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Other(String),
}

impl Method {
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Other(token) => token.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub target: String,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
        }
    }

    /// Reads the request line and consumes the header block. Header values are not
    /// used for anything, only checked against the line and count limits. `Ok(None)`
    /// means the peer hung up before sending anything.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Option<Self>, ServeError> {
        let first_line = match read_line(reader)? {
            Some(line) => line,
            None => return Ok(None),
        };
        debug!("Request line: {}", first_line.trim());

        let parts: Vec<&str> = first_line.split_whitespace().collect();
        let (method, target) = match parts.as_slice() {
            [method, target, version] if version.starts_with("HTTP/") => (*method, *target),
            _ => {
                return Err(ServeError::BadRequest(format!(
                    "bad request line {:?}",
                    first_line.trim()
                )))
            }
        };

        let mut header_count = 0;
        loop {
            let line = read_line(reader)?.unwrap_or_default();
            if line.trim().is_empty() {
                break;
            }
            if header_count == MAX_HEADERS {
                return Err(ServeError::BadRequest(format!(
                    "more than {} headers",
                    MAX_HEADERS
                )));
            }
            debug!("Header line: {}", line.trim());
            header_count += 1;
        }

        Ok(Some(Self {
            method: Method::parse(method),
            target: target.to_string(),
        }))
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ServeError> {
    let mut line = String::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE as u64 + 1)
        .read_line(&mut line)
        .map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => ServeError::BadRequest("request is not UTF-8".into()),
            _ => ServeError::Io(e),
        })?;
    if read == 0 {
        return Ok(None);
    }
    if read > MAX_LINE {
        return Err(ServeError::BadRequest("line too long".into()));
    }
    Ok(Some(line))
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            301 => "Moved Permanently",
            400 => "Bad Request",
            404 => "Not Found",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            _ => "",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

/// A fully buffered response. Headers keep insertion order and may repeat.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append_header(name, value);
        self
    }

    pub fn append_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(format!("HTTP/1.1 {}\r\n", self.status).as_bytes())?;
        for (key, value) in &self.headers {
            writer.write_all(format!("{}: {}\r\n", key, value).as_bytes())?;
        }
        writer.write_all(b"\r\n")?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}
