use std::io;

use http::StatusCode;
use thiserror::Error;

use crate::codec::{ParseState, WriterState};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("handler error: {source}")]
    HandlerError {
        #[from]
        source: HandlerError,
    },
}

/// Errors raised while turning raw bytes into a [`Request`](crate::protocol::Request).
///
/// None of these are retried: "need more data" is signalled by `Ok(None)` from
/// the decoders, never by an error.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("poorly formatted request-line: {reason}")]
    InvalidRequestLine { reason: String },

    #[error("invalid http method: {method}")]
    InvalidMethod { method: String },

    #[error("unrecognised http version: {version}")]
    InvalidVersion { version: String },

    #[error("poorly formatted header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid chunked body: {reason}")]
    InvalidChunk { reason: String },

    #[error("incomplete request, stream ended while in state {state:?}")]
    Incomplete { state: ParseState },

    #[error("trying to read data in a done state")]
    AlreadyDone,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn invalid_request_line<S: ToString>(str: S) -> Self {
        Self::InvalidRequestLine { reason: str.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_version<S: ToString>(version: S) -> Self {
        Self::InvalidVersion { version: version.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_chunk<S: ToString>(str: S) -> Self {
        Self::InvalidChunk { reason: str.to_string() }
    }

    pub fn incomplete(state: ParseState) -> Self {
        Self::Incomplete { state }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if the error came from the transport rather than the peer's bytes.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Errors raised while producing a response.
///
/// Every variant except `Io` is a usage error: the caller drove the writer out
/// of order or handed it something it cannot frame. `Io` comes from the sink.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("writer state needs to be updated for writing {part}, current state: {state:?}")]
    InvalidState { part: &'static str, state: WriterState },

    #[error("unsupported status code: {status}")]
    UnsupportedStatus { status: StatusCode },

    #[error("invalid trailers: {reason}")]
    InvalidTrailers { reason: String },

    #[error("an empty chunk cannot be written, it would end the chunked body")]
    EmptyChunk,

    #[error("chunked body already finished")]
    ChunkedBodyFinished,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_state(part: &'static str, state: WriterState) -> Self {
        Self::InvalidState { part, state }
    }

    pub fn unsupported_status(status: StatusCode) -> Self {
        Self::UnsupportedStatus { status }
    }

    pub fn invalid_trailers<S: ToString>(str: S) -> Self {
        Self::InvalidTrailers { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// An application-level failure, carrying the status the client should see.
#[derive(Error, Debug)]
#[error("status: {status}, message: {message}")]
pub struct HandlerError {
    status: StatusCode,
    message: String,
}

impl HandlerError {
    pub fn new<S: ToString>(status: StatusCode, message: S) -> Self {
        Self { status, message: message.to_string() }
    }

    pub fn bad_request<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SendError> for HandlerError {
    fn from(e: SendError) -> Self {
        Self::internal(e)
    }
}
