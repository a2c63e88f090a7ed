//! Chunked transfer coding for HTTP bodies
//!
//! - [`ChunkedEncoder`]: frames data as `<hex size>\r\n<data>\r\n` records and
//!   writes the terminating `0\r\n`
//! - [`ChunkedDecoder`]: the inverse, including the trailer block
//!
//! Fixed-length request bodies are accumulated directly by the
//! [`RequestDecoder`](crate::codec::RequestDecoder).

mod chunked_decoder;
mod chunked_encoder;

pub use chunked_decoder::ChunkedDecoder;
pub use chunked_encoder::ChunkedEncoder;
