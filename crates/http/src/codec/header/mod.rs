//! Encoders for the line-oriented parts of a response
//!
//! - [`StatusLineEncoder`]: `HTTP/1.1 <code> <reason>\r\n`
//! - [`HeaderEncoder`]: `<name>: <value>\r\n` per field followed by a blank
//!   line. Used for both the header block and the trailer block.
//!
//! Parsing of header lines lives with the collection itself, see
//! [`Headers::parse`](crate::protocol::Headers::parse).

mod header_encoder;

pub use header_encoder::HeaderEncoder;
pub use header_encoder::StatusLineEncoder;
pub use header_encoder::reason_phrase;
