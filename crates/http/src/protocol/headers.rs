//! Case-insensitive header collection with repeated names merged into one value.
//!
//! Unlike [`http::HeaderMap`], which keeps every occurrence of a name, this
//! collection folds repeats into a single value joined with `", "`. The same
//! type is used for request headers, response headers and trailers.

use bytes::BytesMut;
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Token characters allowed in a header name besides ASCII letters and digits.
const TOKEN_SPECIALS: &[u8] = b"!#$%&'*+-.^_`|~";

/// A mapping from lower-case header name to a single string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: HeaderMap,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses at most one CRLF-terminated header line from the front of `src`.
    ///
    /// Returns `(consumed, done)`:
    /// - `(0, false)` when no complete line is available yet
    /// - `(2, true)` when the blank line ending the header block was found
    /// - `(line_len + 2, false)` after a header field was merged into `self`
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidHeader`] if the colon is missing, is the first
    /// character, or is preceded by whitespace, or if the name contains a
    /// character outside the token set.
    pub fn parse(&mut self, src: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(line_end) = find_crlf(src) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            return Ok((CRLF.len(), true));
        }

        let line = &src[..line_end];
        let colon = line
            .iter()
            .position(|b| *b == b':')
            .ok_or_else(|| ParseError::invalid_header(format!("missing colon in {:?}", String::from_utf8_lossy(line))))?;

        ensure!(colon > 0, ParseError::invalid_header(format!("empty field name in {:?}", String::from_utf8_lossy(line))));
        ensure!(
            !matches!(line[colon - 1], b' ' | b'\t'),
            ParseError::invalid_header(format!("whitespace before colon in {:?}", String::from_utf8_lossy(line)))
        );

        let name = line[..colon].trim_ascii();
        ensure!(is_token(name), ParseError::invalid_header(format!("invalid key: {}", String::from_utf8_lossy(name))));

        let name = HeaderName::from_bytes(name).map_err(ParseError::invalid_header)?;
        let value = HeaderValue::from_bytes(line[colon + 1..].trim_ascii()).map_err(ParseError::invalid_header)?;

        trace!(name = %name, "parsed header field");
        self.set(name, value);

        Ok((line_end + CRLF.len(), false))
    }

    /// Adds a value, appending it to any existing value with `", "`.
    pub fn set(&mut self, name: HeaderName, value: HeaderValue) {
        let merged = match self.map.get(&name) {
            Some(existing) => {
                let mut bytes = BytesMut::with_capacity(existing.len() + 2 + value.len());
                bytes.extend_from_slice(existing.as_bytes());
                bytes.extend_from_slice(b", ");
                bytes.extend_from_slice(value.as_bytes());
                // SAFETY: both parts are valid header values and ", " is visible ASCII,
                // so the concatenation contains no forbidden bytes.
                unsafe { HeaderValue::from_maybe_shared_unchecked(bytes.freeze()) }
            }
            None => value,
        };
        self.map.insert(name, merged);
    }

    /// Sets a value, discarding any existing one.
    pub fn replace(&mut self, name: HeaderName, value: HeaderValue) {
        self.map.insert(name, value);
    }

    pub fn remove<K: AsHeaderName>(&mut self, name: K) -> Option<HeaderValue> {
        self.map.remove(name)
    }

    pub fn get<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.map.get(name)
    }

    /// Returns the value as a string, or `None` if absent or not visible ASCII.
    pub fn get_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.map.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn contains<K: AsHeaderName>(&self, name: K) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.map.iter()
    }

    pub fn as_header_map(&self) -> &HeaderMap {
        &self.map
    }
}

/// Returns the offset of the first `\r\n` in `src`.
pub(crate) fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF.len()).position(|window| window == CRLF)
}

fn is_token(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|b| b.is_ascii_alphanumeric() || TOKEN_SPECIALS.contains(b))
}
