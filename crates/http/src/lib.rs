//! HTTP/1.1 over a raw byte stream.
//!
//! This crate turns bytes arriving in arbitrary fragments into a parsed
//! [`Request`](protocol::Request), and produces a response strictly in wire
//! order: status line, headers, body (plain or chunked), then trailers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use http::StatusCode;
//! use tcp_http::connection::HttpConnection;
//! use tcp_http::handler::make_handler;
//! use tcp_http::protocol::{HandlerError, Request};
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:42069").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = Arc::clone(&handler);
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(handler).await {
//!                 Ok(()) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!(cause = %e, "connection shutdown with error"),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Result<(StatusCode, String), HandlerError> {
//!     info!(path = request.target(), "request path");
//!     Ok((StatusCode::OK, "Hello World!\n".to_string()))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: headers, request and error types
//! - [`codec`]: buffer-level decoders and encoders built on `tokio_util::codec`
//! - [`connection`]: drives the codecs against async readers and writers
//! - [`handler`]: the trait a request handler implements
//!
//! # Limitations
//!
//! - HTTP/1.1 only, one request per connection
//! - Request bodies are read by `Content-Length` only; chunked request bodies
//!   are not decoded
//! - No TLS support

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
