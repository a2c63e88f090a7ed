//! HTTP request decoder module
//!
//! This module turns a byte stream into a [`Request`] using a forward-only state
//! machine:
//!
//! ```text
//! Start -> ParsingHeaders -> ParsingBody -> Done
//! ```
//!
//! Each call to [`RequestDecoder::decode`] advances the machine as far as the
//! buffered bytes allow and removes what it consumed from the buffer. A step that
//! consumes nothing and does not change state means more input is needed, and
//! `decode` returns `Ok(None)`.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use tcp_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"[..]);
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/");
//! ```

use bytes::{Buf, BytesMut};
use http::header;
use tokio_util::codec::Decoder;
use tracing::{trace, warn};

use crate::codec::request_line::parse_request_line;
use crate::ensure;
use crate::protocol::{Headers, ParseError, Request, RequestLine};

/// The parse states, in the only order they may be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Start,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// A decoder for a single HTTP/1.1 request.
///
/// The decoder owns the request under construction until it is complete; the
/// finished [`Request`] is then handed to the caller and the decoder stays in
/// [`ParseState::Done`]. Any further decode attempt is an error.
#[derive(Debug)]
pub struct RequestDecoder {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: Headers,
    body: BytesMut,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Runs one state transition over `src` and returns how many bytes it consumed.
    fn step(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Start => match parse_request_line(src)? {
                Some((request_line, consumed)) => {
                    trace!(request_line = %request_line, "parsed request line");
                    self.request_line = Some(request_line);
                    self.state = ParseState::ParsingHeaders;
                    Ok(consumed)
                }
                None => Ok(0),
            },

            ParseState::ParsingHeaders => {
                let (consumed, done) = self.headers.parse(src)?;
                if done {
                    trace!(header_count = self.headers.len(), "parsed header block");
                    if self.headers.contains(header::TRANSFER_ENCODING) {
                        warn!("request transfer-encoding is not supported, body will not be decoded");
                    }
                    self.state = ParseState::ParsingBody;
                }
                Ok(consumed)
            }

            ParseState::ParsingBody => {
                let Some(length) = self.content_length()? else {
                    // no declared length, whatever follows the header block is ignored
                    self.state = ParseState::Done;
                    return Ok(src.len());
                };

                self.body.extend_from_slice(src);
                let body_len = self.body.len() as u64;
                ensure!(
                    body_len <= length,
                    ParseError::invalid_body(format!("content length ({length}) header cannot be less than body length ({body_len})"))
                );

                if body_len == length {
                    self.state = ParseState::Done;
                }
                Ok(src.len())
            }

            ParseState::Done => Err(ParseError::AlreadyDone),
        }
    }

    /// Returns the declared `Content-Length`, if any.
    fn content_length(&self) -> Result<Option<u64>, ParseError> {
        let Some(value) = self.headers.get(header::CONTENT_LENGTH) else {
            return Ok(None);
        };

        let bytes = value.as_bytes();
        ensure!(
            !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit),
            ParseError::invalid_content_length(format!("value {} is not a non-negative integer", String::from_utf8_lossy(bytes)))
        );

        // only ascii digits here, so the str conversion cannot fail
        let digits = std::str::from_utf8(bytes).map_err(ParseError::invalid_content_length)?;
        digits.parse::<u64>().map(Some).map_err(|e| ParseError::invalid_content_length(format!("value {digits} is not u64: {e}")))
    }

    /// Returns true if the body already holds everything the headers declared.
    fn body_satisfied(&self) -> Result<bool, ParseError> {
        Ok(match self.content_length()? {
            Some(length) => self.body.len() as u64 == length,
            None => true,
        })
    }

    fn finish(&mut self) -> Result<Request, ParseError> {
        let request_line = self.request_line.take().ok_or(ParseError::AlreadyDone)?;
        let headers = std::mem::take(&mut self.headers);
        let body = self.body.split().freeze();
        Ok(Request::new(request_line, headers, body))
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { state: ParseState::Start, request_line: None, headers: Headers::new(), body: BytesMut::new() }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode a complete request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: a fatal format error, or the decoder was already done
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        ensure!(self.state != ParseState::Done, ParseError::AlreadyDone);

        loop {
            let before = self.state;
            let consumed = self.step(src)?;
            src.advance(consumed);

            if self.state == ParseState::Done {
                return self.finish().map(Some);
            }

            if consumed == 0 && self.state == before {
                trace!(state = ?self.state, buffered = src.len(), "need more data");
                return Ok(None);
            }
        }
    }

    /// Decodes what is left once the byte source reported end-of-stream.
    ///
    /// A request whose body already satisfies its declared length is accepted;
    /// anything else is [`ParseError::Incomplete`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        if self.state == ParseState::ParsingBody && self.body_satisfied()? {
            self.state = ParseState::Done;
            return self.finish().map(Some);
        }

        Err(ParseError::incomplete(self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Version};
    use indoc::indoc;

    fn crlf(s: &str) -> BytesMut {
        BytesMut::from(s.replace('\n', "\r\n").as_str())
    }

    /// Feeds `data` to a fresh decoder `chunk_size` bytes at a time.
    fn decode_in_chunks(data: &[u8], chunk_size: usize) -> Result<Option<Request>, ParseError> {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::new();
        for chunk in data.chunks(chunk_size) {
            buffer.extend_from_slice(chunk);
            if let Some(request) = decoder.decode(&mut buffer)? {
                return Ok(Some(request));
            }
        }
        decoder.decode_eof(&mut buffer)
    }

    #[test]
    fn get_without_body() {
        let mut buffer = crlf(indoc! {"
            GET /path HTTP/1.1
            Host: x

        "});

        let mut decoder = RequestDecoder::new();
        let request = decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(decoder.state(), ParseState::Done);
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.target(), "/path");
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.headers().get_str("host"), Some("x"));
        assert!(request.body().is_empty());
    }

    #[test]
    fn standard_headers() {
        let mut buffer = crlf(indoc! {"
            GET / HTTP/1.1
            Host: localhost:42069
            User-Agent: curl/7.81.0
            Accept: */*

        "});

        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();

        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.headers().get_str("host"), Some("localhost:42069"));
        assert_eq!(request.headers().get_str("user-agent"), Some("curl/7.81.0"));
        assert_eq!(request.headers().get_str("accept"), Some("*/*"));
    }

    #[test]
    fn post_with_body() {
        let data = crlf(indoc! {"
            POST /submit HTTP/1.1
            Host: localhost:42069
            Content-Length: 13

        "});
        let mut buffer = data;
        buffer.extend_from_slice(b"hello world!\n");

        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(&request.body()[..], b"hello world!\n");
        assert!(buffer.is_empty());
    }

    #[test]
    fn fragmentation_does_not_change_the_result() {
        let mut data = crlf(indoc! {"
            POST /coffee HTTP/1.1
            Host: localhost:42069
            Set-Person: lane
            set-person: prime
            Content-Length: 11

        "});
        data.extend_from_slice(b"partial con");

        let whole = decode_in_chunks(&data, data.len()).unwrap().unwrap();
        assert_eq!(whole.headers().get_str("set-person"), Some("lane, prime"));

        for chunk_size in 1..data.len() {
            let request = decode_in_chunks(&data, chunk_size).unwrap().unwrap();
            assert_eq!(request, whole, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn body_shorter_than_content_length_is_incomplete() {
        let mut buffer = crlf(indoc! {"
            POST /submit HTTP/1.1
            Host: localhost:42069
            Content-Length: 20

        "});
        buffer.extend_from_slice(b"partial content");

        let mut decoder = RequestDecoder::new();
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(decoder.state(), ParseState::ParsingBody);

        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::Incomplete { state: ParseState::ParsingBody })));
    }

    #[test]
    fn body_longer_than_content_length_is_rejected() {
        let mut buffer = crlf(indoc! {"
            POST /submit HTTP/1.1
            Content-Length: 4

        "});
        buffer.extend_from_slice(b"too long");

        let result = RequestDecoder::new().decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidBody { .. })));
    }

    #[test]
    fn zero_content_length() {
        let mut buffer = crlf(indoc! {"
            POST /submit HTTP/1.1
            Content-Length: 0

        "});

        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert!(request.body().is_empty());
    }

    #[test]
    fn missing_content_length_ignores_trailing_bytes() {
        let mut buffer = crlf(indoc! {"
            POST /submit HTTP/1.1
            Host: localhost:42069

        "});
        buffer.extend_from_slice(b"ignored");

        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert!(request.body().is_empty());
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_content_length() {
        for value in ["abc", "-1", "+5", "5, 5", ""] {
            let mut buffer = crlf(&format!("POST / HTTP/1.1\nContent-Length: {value}\n\nhello"));
            let result = RequestDecoder::new().decode(&mut buffer);
            assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })), "value {value:?}");
        }
    }

    #[test]
    fn malformed_header_is_rejected() {
        let mut buffer = crlf(indoc! {"
            GET / HTTP/1.1
            Host localhost:42069

        "});

        let result = RequestDecoder::new().decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn malformed_request_line_is_rejected() {
        let mut buffer = crlf("/coffee HTTP/1.1\nHost: localhost:42069\n\n");

        let result = RequestDecoder::new().decode(&mut buffer);
        assert!(matches!(result, Err(ParseError::InvalidRequestLine { .. })));
    }

    #[test]
    fn eof_before_headers_finish_is_incomplete() {
        let mut buffer = crlf("GET / HTTP/1.1\nHost: localhost");

        let mut decoder = RequestDecoder::new();
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(decoder.state(), ParseState::ParsingHeaders);
        assert!(matches!(decoder.decode_eof(&mut buffer), Err(ParseError::Incomplete { state: ParseState::ParsingHeaders })));
    }

    #[test]
    fn eof_on_empty_stream_is_incomplete() {
        let mut buffer = BytesMut::new();
        let result = RequestDecoder::new().decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::Incomplete { state: ParseState::Start })));
    }

    #[test]
    fn decode_after_done_is_an_error() {
        let mut buffer = crlf("GET / HTTP/1.1\n\n");

        let mut decoder = RequestDecoder::new();
        assert!(decoder.decode(&mut buffer).unwrap().is_some());
        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::AlreadyDone)));
    }
}
