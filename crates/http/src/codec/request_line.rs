//! Request-line parsing: `<METHOD> <target> HTTP/1.1\r\n`.

use http::{Method, Version};

use crate::ensure;
use crate::protocol::{ParseError, RequestLine, find_crlf};

const HTTP_NAME: &str = "HTTP";
const HTTP_VERSION: &str = "1.1";

/// Parses the request line at the front of `src`.
///
/// Returns `Ok(None)` if the line terminator has not arrived yet, otherwise the
/// parsed line and the number of bytes it occupied including the CRLF.
pub(crate) fn parse_request_line(src: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_end) = find_crlf(src) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&src[..line_end]).map_err(|_| ParseError::invalid_request_line("request-line is not valid utf-8"))?;
    let request_line = request_line_from_str(line)?;

    Ok(Some((request_line, line_end + 2)))
}

fn request_line_from_str(line: &str) -> Result<RequestLine, ParseError> {
    let parts = line.split(' ').collect::<Vec<_>>();
    let &[method, target, version] = parts.as_slice() else {
        return Err(ParseError::invalid_request_line(line));
    };

    ensure!(!method.is_empty() && method.bytes().all(|b| b.is_ascii_uppercase()), ParseError::invalid_method(method));
    let method = Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::invalid_method(method))?;

    let Some((name, number)) = version.split_once('/') else {
        return Err(ParseError::invalid_request_line(line));
    };
    ensure!(name == HTTP_NAME, ParseError::invalid_version(name));
    ensure!(number == HTTP_VERSION, ParseError::invalid_version(number));

    Ok(RequestLine::new(method, target.to_string(), Version::HTTP_11))
}
