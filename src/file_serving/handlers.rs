use chrono::Utc;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::mime::content_type_for;
use super::path_utils::{resolve_file, Resolution};
use crate::error::ServeError;
use crate::http::{Method, Request, Response, StatusCode};
use crate::logging::LoggingExt;
use crate::{log_request, log_response};

pub const SERVER_NAME: &str = concat!("coi-serve/", env!("CARGO_PKG_VERSION"));

/// Appended last to every response, in this order.
pub const CROSS_ORIGIN_HEADERS: [(&str, &str); 2] = [
    ("Cross-Origin-Opener-Policy", "same-origin"),
    ("Cross-Origin-Embedder-Policy", "require-corp"),
];

/// Answers GET/HEAD requests with files from a single root directory.
#[derive(Debug, Clone)]
pub struct StaticAssetResponder {
    root: PathBuf,
}

impl StaticAssetResponder {
    /// Canonicalizes `root` once; it must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        let root = root.log_operation("canonicalize", || fs::canonicalize(root))?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn handle(&self, request: &Request) -> Response {
        let start_time = Instant::now();
        log_request!(request.method, request.target);

        let is_head = request.method == Method::Head;
        let response = match self.serve(request, is_head) {
            Ok(response) => response,
            Err(e) => {
                log::debug!("{} {} failed: {}", request.method, request.target, e);
                error_response(&e, is_head)
            }
        };
        let response = with_cross_origin_headers(response);

        log_response!(response.status, start_time.elapsed(), response.body.len());
        response
    }

    /// Builds the reply for a request that never made it past parsing.
    pub fn handle_error(&self, err: &ServeError) -> Response {
        log::warn!("Rejecting request: {}", err);
        with_cross_origin_headers(error_response(err, false))
    }

    fn serve(&self, request: &Request, is_head: bool) -> Result<Response, ServeError> {
        if let Method::Other(method) = &request.method {
            return Err(ServeError::MethodNotImplemented(method.clone()));
        }

        let resolved = match resolve_file(&self.root, &request.target)? {
            Resolution::File(resolved) => resolved,
            Resolution::Redirect(location) => {
                return Ok(
                    base_response(StatusCode::MOVED_PERMANENTLY, "text/plain; charset=utf-8", 0)
                        .header("Location", location),
                )
            }
        };
        let path = resolved.path;
        log::debug!("Resolved {} to {}", request.target, path.display());

        let mut file = File::open(&path).map_err(ServeError::from_fs)?;
        let length = file.metadata()?.len();
        let content_type = content_type_for(&resolved.served_as);

        let mut response = base_response(StatusCode::OK, &content_type, length);
        if !is_head {
            let mut content = Vec::with_capacity(length as usize);
            path.log_operation("read", || file.read_to_end(&mut content))?;
            if content.len() as u64 != length {
                // File changed since its metadata was read
                response = base_response(StatusCode::OK, &content_type, content.len() as u64);
            }
            response.body = content;
        }
        Ok(response)
    }
}

fn base_response(status: StatusCode, content_type: &str, content_length: u64) -> Response {
    Response::new(status)
        .header("Server", SERVER_NAME)
        .header("Date", http_date())
        .header("Content-Type", content_type)
        .header("Content-Length", content_length.to_string())
        .header("Connection", "close")
}

fn error_response(err: &ServeError, is_head: bool) -> Response {
    let status = err.status();
    let body = format!("{}\n", status).into_bytes();
    let response = base_response(status, "text/plain; charset=utf-8", body.len() as u64);
    if is_head {
        response
    } else {
        response.body(body)
    }
}

fn with_cross_origin_headers(mut response: Response) -> Response {
    for (name, value) in CROSS_ORIGIN_HEADERS {
        response.append_header(name, value);
    }
    response
}

fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
