//! TCP transport and demo application for `tcp-http`.
//!
//! [`Server`] binds a listener and runs one
//! [`HttpConnection`](tcp_http::connection::HttpConnection) per accepted
//! connection. [`Router`] is the handler behind the `httpserver` binary,
//! [`RequestReport`] the output of the `tcplistener` binary, which only parses
//! and prints each request it receives.

pub mod opts;

mod inspect;
mod router;
mod server;

pub use inspect::RequestReport;
pub use router::{MAX_STREAM_LINES, Router};
pub use server::{Server, ServerBuilder, ServerError, ServerHandle};
