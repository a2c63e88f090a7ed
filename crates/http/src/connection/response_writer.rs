use futures::SinkExt;
use http::{HeaderName, HeaderValue, StatusCode, header};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::FramedWrite;
use tracing::trace;

use crate::codec::{ResponseEncoder, ResponsePart, WriterState};
use crate::protocol::{Headers, SendError};

/// Writes one response to a byte sink, enforcing the production order.
///
/// Status line and headers are buffered and go out together with the first
/// body write. Every operation that is not legal in the current
/// [`WriterState`] fails with [`SendError::InvalidState`] without writing.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self { framed_write: FramedWrite::new(writer, ResponseEncoder::new()) }
    }

    pub fn state(&self) -> WriterState {
        self.framed_write.encoder().state()
    }

    pub fn is_done(&self) -> bool {
        self.framed_write.encoder().is_done()
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), SendError> {
        trace!(%status, "writing status line");
        self.framed_write.feed(ResponsePart::StatusLine(status)).await
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), SendError> {
        self.framed_write.feed(ResponsePart::Headers(headers)).await
    }

    /// Writes the whole body of a response without `Transfer-Encoding`.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<(), SendError> {
        self.framed_write.send(ResponsePart::Body(body)).await
    }

    /// Writes one chunk and returns the number of data bytes it carried.
    ///
    /// An empty chunk is refused with [`SendError::EmptyChunk`]: its zero size
    /// would read as the end of the body. Use
    /// [`write_chunked_body_done`](Self::write_chunked_body_done) for that.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, SendError> {
        self.framed_write.send(ResponsePart::Chunk(chunk)).await?;
        Ok(chunk.len())
    }

    /// Writes the zero-size chunk ending the body. Trailers must follow.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), SendError> {
        self.framed_write.feed(ResponsePart::ChunkedDone).await
    }

    /// Writes the trailer block and completes the response.
    ///
    /// After a plain body only an empty trailer set is accepted, and it
    /// produces no bytes.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), SendError> {
        self.framed_write.send(ResponsePart::Trailers(trailers)).await
    }

    pub fn get_ref(&self) -> &W {
        self.framed_write.get_ref()
    }

    pub fn get_mut(&mut self) -> &mut W {
        self.framed_write.get_mut()
    }

    /// Flushes whatever is buffered and returns the sink.
    pub async fn finish(mut self) -> Result<W, SendError> {
        self.framed_write.flush().await?;
        Ok(self.framed_write.into_inner())
    }

    /// Flushes and shuts down the sink.
    ///
    /// The shutdown is attempted even when the flush fails; the first error is
    /// returned.
    pub async fn close(mut self) -> Result<(), SendError> {
        let flushed = self.framed_write.flush().await;
        let shutdown = self.framed_write.get_mut().shutdown().await;
        flushed?;
        shutdown?;
        Ok(())
    }
}

/// The headers every plain response starts from.
///
/// `content-length` is set to the given length, `connection` to `close` and
/// `content-type` to `text/plain`. Callers replace entries as needed.
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set(header::CONTENT_LENGTH, HeaderValue::from(content_length));
    headers.set(header::CONNECTION, HeaderValue::from_static("close"));
    headers.set(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers
}

/// The headers of a chunked response: [`default_headers`] without
/// `content-length`, plus `transfer-encoding: chunked`.
pub fn chunked_headers() -> Headers {
    let mut headers = Headers::new();
    headers.set(header::CONNECTION, HeaderValue::from_static("close"));
    headers.set(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    headers.set(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
    headers
}

/// Announces trailer names in the `trailer` header.
pub fn declare_trailers(headers: &mut Headers, names: &[HeaderName]) {
    let declared = names.iter().map(HeaderName::as_str).collect::<Vec<_>>().join(", ");
    if let Ok(value) = HeaderValue::from_str(&declared) {
        headers.replace(header::TRAILER, value);
    }
}
