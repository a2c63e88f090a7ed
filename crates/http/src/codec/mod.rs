//! HTTP codec module for decoding requests and encoding responses
//!
//! Both directions are state machines over a [`BytesMut`] buffer and implement
//! the `tokio_util` codec traits, so they can be driven by hand or plugged into
//! `FramedRead` / `FramedWrite`.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: request line, header block and `Content-Length` body
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: enforces status line, headers, body, trailers order
//!   - [`StatusLineEncoder`] and [`HeaderEncoder`] for the line-oriented parts
//!   - [`ChunkedEncoder`] / [`ChunkedDecoder`] for chunked bodies
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::StatusCode;
//! use tcp_http::codec::{ResponseEncoder, ResponsePart};
//! use tcp_http::protocol::Headers;
//! use tokio_util::codec::Encoder;
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut buffer = BytesMut::new();
//! encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut buffer).unwrap();
//! encoder.encode(ResponsePart::Headers(&Headers::new()), &mut buffer).unwrap();
//! assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\n\r\n");
//! ```

use std::io;

use bytes::{BufMut, BytesMut};

mod body;
mod header;
mod request_decoder;
mod request_line;
mod response_encoder;

pub use body::{ChunkedDecoder, ChunkedEncoder};
pub use header::{HeaderEncoder, StatusLineEncoder, reason_phrase};
pub use request_decoder::{ParseState, RequestDecoder};
pub use response_encoder::{ResponseEncoder, ResponsePart, WriterState};

/// `io::Write` adapter appending straight into a `BytesMut`.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl io::Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
