//! Serialization of the status line and of header/trailer blocks.

use bytes::{BufMut, BytesMut};
use http::StatusCode;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::FastWrite;
use crate::protocol::{Headers, SendError};

/// Initial buffer size reserved for a header block
const INIT_HEADER_SIZE: usize = 1024;

/// Returns the reason phrase for the status codes this server can emit.
pub fn reason_phrase(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::OK => Some("OK"),
        StatusCode::BAD_REQUEST => Some("Bad Request"),
        StatusCode::NOT_FOUND => Some("Not Found"),
        StatusCode::INTERNAL_SERVER_ERROR => Some("Internal Server Error"),
        _ => None,
    }
}

/// Encoder for the `HTTP/1.1 <code> <reason>\r\n` status line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusLineEncoder;

impl Encoder<StatusCode> for StatusLineEncoder {
    type Error = SendError;

    /// # Errors
    ///
    /// Returns [`SendError::UnsupportedStatus`] for codes without a known reason
    /// phrase; nothing is written to `dst` in that case.
    fn encode(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let Some(reason) = reason_phrase(status) else {
            error!(status = %status, "unsupported status code");
            return Err(SendError::unsupported_status(status));
        };

        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), reason)?;
        Ok(())
    }
}

/// Encoder for a header or trailer block.
///
/// Field order follows the collection's iteration order, which carries no
/// meaning. The block always ends with an empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<&Headers> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, headers: &Headers, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        for (name, value) in headers.iter() {
            dst.put_slice(name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
