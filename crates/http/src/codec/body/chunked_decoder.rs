//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! The inverse of [`ChunkedEncoder`](super::ChunkedEncoder): read a hex size
//! line, then exactly that many bytes and their CRLF, until a zero-size chunk.
//! The trailer block that follows is parsed line by line with
//! [`Headers::parse`] up to its terminating blank line.

use std::cmp;

use bytes::{Buf, BytesMut};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Headers, ParseError, PayloadItem};

/// A decoder for handling HTTP chunked transfer encoding.
///
/// Yields one [`PayloadItem::Chunk`] per contiguous slice of chunk data it can
/// see (a large chunk may arrive as several items) and [`PayloadItem::Eof`]
/// once the trailer block has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    trailers: Headers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size line
    #[default]
    Size,
    /// Read chunk data
    Data { remaining: u64 },
    /// Read the CRLF after chunk data
    DataEnd,
    /// Read trailer fields up to the blank line
    Trailers,
    /// Final state after the blank line
    End,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder, ready to read the size of the first chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trailer fields read so far; complete once [`PayloadItem::Eof`] was returned.
    pub fn trailers(&self) -> &Headers {
        &self.trailers
    }

    pub fn take_trailers(&mut self) -> Headers {
        std::mem::take(&mut self.trailers)
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when chunk data is available
    /// - `Ok(Some(PayloadItem::Eof))` when the last chunk and the trailers are read
    /// - `Ok(None)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                ChunkedState::Size => {
                    let (consumed, size) = match httparse::parse_chunk_size(src) {
                        Ok(Status::Complete(parsed)) => parsed,
                        Ok(Status::Partial) => return Ok(None),
                        Err(_) => return Err(ParseError::invalid_chunk("invalid chunk size line")),
                    };
                    src.advance(consumed);
                    trace!(size, "read chunk size");

                    self.state = if size == 0 { ChunkedState::Trailers } else { ChunkedState::Data { remaining: size } };
                }

                ChunkedState::Data { remaining } => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let len = cmp::min(remaining, src.len() as u64);
                    // len <= src.len(), so the cast back cannot truncate
                    let bytes = src.split_to(len as usize).freeze();
                    let remaining = remaining - len;

                    self.state = if remaining == 0 { ChunkedState::DataEnd } else { ChunkedState::Data { remaining } };
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                ChunkedState::DataEnd => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    ensure!(&src[..2] == b"\r\n", ParseError::invalid_chunk("missing CRLF after chunk data"));
                    src.advance(2);
                    self.state = ChunkedState::Size;
                }

                ChunkedState::Trailers => {
                    let (consumed, done) = self.trailers.parse(src)?;
                    if consumed == 0 && !done {
                        return Ok(None);
                    }
                    src.advance(consumed);
                    if done {
                        trace!(trailer_count = self.trailers.len(), "finished reading chunked data");
                        self.state = ChunkedState::End;
                    }
                }

                ChunkedState::End => return Ok(Some(PayloadItem::Eof)),
            }
        }
    }

    /// Like [`decode`](Self::decode), but the source has ended: anything short
    /// of a complete trailer block is a truncated body, not a transport error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None if self.state == ChunkedState::End => Ok(None),
            None => Err(ParseError::invalid_chunk(format!("stream ended while reading {}", self.state.describe()))),
        }
    }
}

impl ChunkedState {
    fn describe(self) -> &'static str {
        match self {
            ChunkedState::Size => "a chunk size line",
            ChunkedState::Data { .. } => "chunk data",
            ChunkedState::DataEnd => "the CRLF after chunk data",
            ChunkedState::Trailers => "the trailer block",
            ChunkedState::End => "past the trailer block",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_basic() {
        let mut buffer: BytesMut = BytesMut::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_chunk());
        assert_eq!(&item.as_bytes().unwrap()[..], b"1234567890abcdef");

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_chunks() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b", world"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_chunks_with_extensions() {
        let mut buffer: BytesMut = BytesMut::from(&b"5;chunk-ext=value\r\nhello\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_chunks_with_trailers() {
        let mut buffer: BytesMut =
            BytesMut::from(&b"5\r\nhello\r\n0\r\nX-Content-Length: 5\r\nX-Content-Sha256: abc\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
        assert_eq!(decoder.trailers().get_str("x-content-length"), Some("5"));
        assert_eq!(decoder.trailers().get_str("x-content-sha256"), Some("abc"));
    }

    #[test]
    fn test_malformed_trailer() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\nX-Content-Length 5\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn test_incomplete_chunk() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        // partial chunk data is handed out as soon as it arrives
        let chunk = decoder.decode(&mut buffer).unwrap();
        assert_eq!(chunk.unwrap().as_bytes().unwrap(), &Bytes::copy_from_slice(b"hel"));
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"lo\r\n0\r\n");

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"lo"));

        // trailer block not terminated yet
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        buffer.extend_from_slice(b"\r\n");

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_invalid_chunk_size() {
        let mut buffer: BytesMut = BytesMut::from(&b"xyz\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::InvalidChunk { .. })));
    }

    #[test]
    fn test_missing_crlf() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhelloBad"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::InvalidChunk { .. })));
    }

    #[test]
    fn test_large_chunk() {
        let size = 1024 * 1024;
        let mut data = Vec::with_capacity(size + 16);
        data.extend(format!("{size:x}\r\n").into_bytes());
        data.extend(vec![b'A'; size]);
        data.extend(b"\r\n0\r\n\r\n");

        let mut buffer = BytesMut::from(&data[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().len(), size);
        assert!(chunk.as_bytes().unwrap().iter().all(|&b| b == b'A'));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_eof_inside_size_line() {
        let mut buffer: BytesMut = BytesMut::from(&b"5\r\nhello\r\n1"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::copy_from_slice(b"hello"));

        let err = decoder.decode_eof(&mut buffer).unwrap_err();
        assert!(matches!(err, ParseError::InvalidChunk { .. }));
        assert!(!err.is_io());
    }

    #[test]
    fn test_eof_inside_trailers() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\nX-A: 1"[..]);
        let mut decoder = ChunkedDecoder::new();

        let err = decoder.decode_eof(&mut buffer).unwrap_err();
        assert!(matches!(err, ParseError::InvalidChunk { .. }));
        assert!(err.to_string().contains("trailer block"), "{err}");
    }

    #[test]
    fn test_eof_after_last_item() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        assert!(decoder.decode_eof(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_zero_size_chunk() {
        let mut buffer: BytesMut = BytesMut::from(&b"0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
        assert!(decoder.trailers().is_empty());
    }
}
