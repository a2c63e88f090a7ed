//! Encoder for HTTP chunked transfer encoding.
//!
//! Each chunk is written as `<lower-case hex size>\r\n<data>\r\n`. The end of the
//! body is the zero-size record `0\r\n`; the trailer block that follows it
//! (possibly empty) supplies the final blank line. Since a zero size is
//! reserved for that record, an empty chunk is refused.

use std::io::Write;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::FastWrite;
use crate::ensure;
use crate::protocol::{PayloadItem, SendError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: usize,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false, send_size: 0 }
    }

    /// Returns true once the terminating zero-size chunk has been written.
    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Total number of data bytes framed so far.
    pub fn send_size(&self) -> usize {
        self.send_size
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        ensure!(!self.eof, SendError::ChunkedBodyFinished);

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining();
                ensure!(size != 0, SendError::EmptyChunk);

                write!(FastWrite(dst), "{size:x}\r\n")?;
                dst.reserve(size + 2);
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                dst.extend_from_slice(b"\r\n");
                self.send_size += size;
                trace!(size, "encoded chunk");
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n");
                trace!(total = self.send_size, "encoded last chunk");
                Ok(())
            }
        }
    }
}
