//! Core HTTP protocol types shared by the parser and the response writer.
//!
//! # Components
//!
//! - **Headers** ([`Headers`]): case-insensitive collection merging repeated
//!   names with `", "`, plus the line-at-a-time header parser
//! - **Requests** ([`Request`], [`RequestLine`]): the value handed to handlers
//!   once parsing completes
//! - **Payload** ([`PayloadItem`]): chunk-or-eof items for chunked bodies
//! - **Errors** ([`HttpError`], [`ParseError`], [`SendError`], [`HandlerError`])

mod headers;
pub use headers::Headers;
pub(crate) use headers::find_crlf;

mod message;
pub use message::PayloadItem;

mod request;
pub use request::Request;
pub use request::RequestLine;

mod error;
pub use error::HandlerError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
