use std::fmt;

use tcp_http::protocol::Request;

/// Displays a parsed request the way `tcplistener` prints it.
///
/// ```text
/// Request line:
/// - Method: POST
/// - Target: /coffee
/// - Version: HTTP/1.1
/// Headers:
/// - host: localhost:42069
/// Body:
/// hello
/// ```
///
/// Header names appear lower-cased, repeated headers as their merged value.
/// A body that is not UTF-8 is shown lossily.
#[derive(Debug, Clone, Copy)]
pub struct RequestReport<'a>(pub &'a Request);

impl fmt::Display for RequestReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.0;

        writeln!(f, "Request line:")?;
        writeln!(f, "- Method: {}", request.method())?;
        writeln!(f, "- Target: {}", request.target())?;
        writeln!(f, "- Version: {:?}", request.version())?;

        writeln!(f, "Headers:")?;
        for (name, value) in request.headers().iter() {
            writeln!(f, "- {name}: {}", String::from_utf8_lossy(value.as_bytes()))?;
        }

        writeln!(f, "Body:")?;
        writeln!(f, "{}", String::from_utf8_lossy(request.body()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderName, HeaderValue, Method, Version};
    use indoc::indoc;
    use tcp_http::protocol::{Headers, RequestLine};

    fn request(method: Method, target: &str, headers: &[(&'static str, &'static str)], body: &'static [u8]) -> Request {
        let mut collection = Headers::new();
        for (name, value) in headers {
            collection.set(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        Request::new(RequestLine::new(method, target.to_string(), Version::HTTP_11), collection, Bytes::from_static(body))
    }

    #[test]
    fn request_with_merged_headers_and_body() {
        let request = request(
            Method::POST,
            "/coffee",
            &[("host", "localhost:42069"), ("accept", "text/plain"), ("accept", "*/*"), ("content-length", "13")],
            b"hello world!\n",
        );

        let expected = indoc! {"
            Request line:
            - Method: POST
            - Target: /coffee
            - Version: HTTP/1.1
            Headers:
            - host: localhost:42069
            - accept: text/plain, */*
            - content-length: 13
            Body:
            hello world!

        "};
        assert_eq!(RequestReport(&request).to_string(), expected);
    }

    #[test]
    fn request_without_headers_or_body() {
        let request = request(Method::GET, "/", &[], b"");

        let expected = indoc! {"
            Request line:
            - Method: GET
            - Target: /
            - Version: HTTP/1.1
            Headers:
            Body:

        "};
        assert_eq!(RequestReport(&request).to_string(), expected);
    }
}
