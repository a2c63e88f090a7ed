use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::trace;

use crate::codec::ChunkedDecoder;
use crate::protocol::{Headers, ParseError, PayloadItem};

/// Reads a complete chunked body from `reader`.
///
/// Returns the concatenated chunk data together with the trailer fields.
///
/// # Errors
///
/// Any malformed framing is reported by the [`ChunkedDecoder`]. If the source
/// ends before the terminating chunk and its trailer block,
/// [`ParseError::InvalidChunk`] is returned.
pub async fn read_chunked_body<R>(reader: R) -> Result<(Bytes, Headers), ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut framed_read = FramedRead::new(reader, ChunkedDecoder::new());
    let mut body = BytesMut::new();

    while let Some(item) = framed_read.next().await {
        match item? {
            PayloadItem::Chunk(chunk) => {
                trace!(size = chunk.len(), "read body chunk");
                body.extend_from_slice(&chunk);
            }
            PayloadItem::Eof => {
                let trailers = framed_read.decoder_mut().take_trailers();
                return Ok((body.freeze(), trailers));
            }
        }
    }

    Err(ParseError::invalid_chunk("stream ended before the last chunk"))
}
