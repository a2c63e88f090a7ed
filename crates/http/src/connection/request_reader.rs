use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::{ParseState, RequestDecoder};
use crate::protocol::{ParseError, Request};

/// Initial receive buffer capacity; doubled whenever it fills up.
const INIT_BUFFER_SIZE: usize = 8;

/// Reads a single [`Request`] from a byte source.
///
/// Bytes are read into a growable buffer and handed to a [`RequestDecoder`]
/// after every read. The decoder removes what it consumed, so the buffer only
/// holds the unconsumed tail plus the latest read.
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    buffer: BytesMut,
    decoder: RequestDecoder,
}

impl<R> RequestReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, INIT_BUFFER_SIZE)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self { reader, buffer: BytesMut::with_capacity(capacity.max(1)), decoder: RequestDecoder::new() }
    }

    pub fn state(&self) -> ParseState {
        self.decoder.state()
    }

    /// Bytes read from the source but not consumed by the parser.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads until a complete request has been parsed.
    ///
    /// # Errors
    ///
    /// - any format error from the decoder
    /// - [`ParseError::Incomplete`] if the source ends before the request does
    /// - [`ParseError::Io`] if reading fails
    pub async fn read_request(&mut self) -> Result<Request, ParseError> {
        loop {
            if self.buffer.len() == self.buffer.capacity() {
                // reserve also moves the unconsumed tail back to the front when it can
                let additional = self.buffer.capacity().max(INIT_BUFFER_SIZE);
                self.buffer.reserve(additional);
            }

            let read = self.reader.read_buf(&mut self.buffer).await?;
            if read == 0 {
                trace!(state = ?self.decoder.state(), buffered = self.buffer.len(), "reached end of stream");
                return match self.decoder.decode_eof(&mut self.buffer)? {
                    Some(request) => Ok(request),
                    None => Err(ParseError::incomplete(self.decoder.state())),
                };
            }

            trace!(read, buffered = self.buffer.len(), capacity = self.buffer.capacity(), "read request bytes");
            if let Some(request) = self.decoder.decode(&mut self.buffer)? {
                return Ok(request);
            }
        }
    }
}
