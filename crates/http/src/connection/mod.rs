//! Connection handling over async byte streams.
//!
//! The codecs in [`crate::codec`] work on in-memory buffers. This module
//! drives them against real sources and sinks:
//!
//! - [`RequestReader`]: reads from an [`AsyncRead`](tokio::io::AsyncRead)
//!   into a growing buffer until one request is parsed
//! - [`ResponseWriter`]: writes the parts of one response in order
//! - [`read_chunked_body`]: consumes a chunked body and its trailers
//! - [`HttpConnection`]: a single request/response exchange with a
//!   [`Handler`](crate::handler::Handler)

mod chunked_body;
mod http_connection;
mod request_reader;
mod response_writer;

pub use chunked_body::read_chunked_body;
pub use http_connection::HttpConnection;
pub use request_reader::RequestReader;
pub use response_writer::{ResponseWriter, chunked_headers, declare_trailers, default_headers};
