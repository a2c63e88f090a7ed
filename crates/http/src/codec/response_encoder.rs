//! Ordered response encoding.
//!
//! A response is produced in a fixed order:
//!
//! ```text
//! StatusLine -> Headers -> Body ---------> Trailers -> Done
//!                       \-> ChunkedBody -/
//! ```
//!
//! [`ResponseEncoder`] tracks where the response is and refuses any part that
//! is not legal in the current state. The check happens before anything is
//! written, so a rejected part leaves the destination buffer untouched.

use bytes::BytesMut;
use http::{HeaderValue, StatusCode, header};
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

use crate::codec::body::ChunkedEncoder;
use crate::codec::header::{HeaderEncoder, StatusLineEncoder};
use crate::ensure;
use crate::protocol::{Headers, PayloadItem, SendError};

/// Where a response is in its production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    /// Expecting a single `Content-Length` style body.
    Body,
    /// Headers declared `Transfer-Encoding`; expecting chunks.
    ChunkedBody,
    Trailers,
    Done,
}

/// One part of a response, in the order they must be encoded.
#[derive(Debug, Clone, Copy)]
pub enum ResponsePart<'a> {
    StatusLine(StatusCode),
    Headers(&'a Headers),
    /// The whole body, written verbatim.
    Body(&'a [u8]),
    /// One chunk of a chunked body.
    Chunk(&'a [u8]),
    /// The terminating zero-size chunk.
    ChunkedDone,
    Trailers(&'a Headers),
}

/// Encoder enforcing the response production order.
#[derive(Debug)]
pub struct ResponseEncoder {
    state: WriterState,
    chunked: bool,
    chunked_encoder: ChunkedEncoder,
    declared_trailers: Option<HeaderValue>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == WriterState::Done
    }

    fn expect(&self, state: WriterState, part: &'static str) -> Result<(), SendError> {
        ensure!(self.state == state, SendError::invalid_state(part, self.state));
        Ok(())
    }

    fn encode_headers(&mut self, headers: &Headers, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect(WriterState::Headers, "headers")?;

        self.chunked = headers.contains(header::TRANSFER_ENCODING);
        if self.chunked && headers.contains(header::CONTENT_LENGTH) {
            warn!("response declares both transfer-encoding and content-length");
        }
        self.declared_trailers = headers.get(header::TRAILER).cloned();

        HeaderEncoder.encode(headers, dst)?;
        self.state = if self.chunked { WriterState::ChunkedBody } else { WriterState::Body };
        Ok(())
    }

    fn encode_trailers(&mut self, trailers: &Headers, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect(WriterState::Trailers, "trailers")?;

        if !self.chunked {
            // Trailers are allowed after a plain body only as an empty set,
            // which completes the response without bytes. A non-empty set is
            // refused: a fixed-length body has no framing to carry it.
            ensure!(trailers.is_empty(), SendError::invalid_trailers("trailers require a chunked body"));
            self.state = WriterState::Done;
            return Ok(());
        }

        for (name, _) in trailers.iter() {
            if !self.is_declared_trailer(name.as_str()) {
                warn!(trailer = %name, "trailer was not announced in the trailer header");
            }
        }

        HeaderEncoder.encode(trailers, dst)?;
        self.state = WriterState::Done;
        Ok(())
    }

    fn is_declared_trailer(&self, name: &str) -> bool {
        let Some(declared) = self.declared_trailers.as_ref().and_then(|value| value.to_str().ok()) else {
            return false;
        };
        declared.split(',').any(|declared| declared.trim().eq_ignore_ascii_case(name))
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { state: WriterState::StatusLine, chunked: false, chunked_encoder: ChunkedEncoder::new(), declared_trailers: None }
    }
}

impl<'a> Encoder<ResponsePart<'a>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponsePart<'a>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            ResponsePart::StatusLine(status) => {
                self.expect(WriterState::StatusLine, "status line")?;
                StatusLineEncoder.encode(status, dst)?;
                self.state = WriterState::Headers;
            }

            ResponsePart::Headers(headers) => self.encode_headers(headers, dst)?,

            ResponsePart::Body(body) => {
                self.expect(WriterState::Body, "body")?;
                dst.extend_from_slice(body);
                trace!(size = body.len(), "encoded body");
                self.state = WriterState::Trailers;
            }

            ResponsePart::Chunk(chunk) => {
                self.expect(WriterState::ChunkedBody, "chunked body")?;
                self.chunked_encoder.encode(PayloadItem::Chunk(chunk), dst)?;
            }

            ResponsePart::ChunkedDone => {
                self.expect(WriterState::ChunkedBody, "chunked body done")?;
                self.chunked_encoder.encode(PayloadItem::<&[u8]>::Eof, dst)?;
                self.state = WriterState::Trailers;
            }

            ResponsePart::Trailers(trailers) => self.encode_trailers(trailers, dst)?,
        }

        Ok(())
    }
}
