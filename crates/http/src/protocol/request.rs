//! Parsed HTTP request types.
//!
//! A [`Request`] is produced by [`RequestDecoder`](crate::codec::RequestDecoder)
//! once the request line, the header block and the declared body have all been
//! read. It is read-only from then on.

use std::fmt;

use bytes::Bytes;
use http::{Method, Version};

use crate::protocol::Headers;

/// The first line of a request: `<METHOD> <target> HTTP/1.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: Version,
}

impl RequestLine {
    pub fn new(method: Method, target: String, version: Version) -> Self {
        Self { method, target, version }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as sent, without any URI interpretation.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.target, self.version)
    }
}

/// A fully parsed request: request line, merged headers and the body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    line: RequestLine,
    headers: Headers,
    body: Bytes,
}

impl Request {
    pub fn new(line: RequestLine, headers: Headers, body: Bytes) -> Self {
        Self { line, headers, body }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    pub fn method(&self) -> &Method {
        self.line.method()
    }

    pub fn target(&self) -> &str {
        self.line.target()
    }

    pub fn version(&self) -> Version {
        self.line.version()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The body; empty when the request carried no `Content-Length`.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (RequestLine, Headers, Bytes) {
        (self.line, self.headers, self.body)
    }
}
