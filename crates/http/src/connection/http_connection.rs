use std::sync::Arc;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, info, warn};

use crate::codec::{WriterState, reason_phrase};
use crate::connection::{RequestReader, ResponseWriter, default_headers};
use crate::handler::Handler;
use crate::protocol::{Headers, HttpError, ParseError, Request, SendError};

/// One request/response exchange over a connection.
///
/// `HttpConnection` reads a single request, hands it to the [`Handler`] and
/// closes the write side once the handler returns. There is no keep-alive:
/// every response carries `connection: close`.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    reader: RequestReader<R>,
    writer: ResponseWriter<W>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader: RequestReader::new(reader), writer: ResponseWriter::new(writer) }
    }

    /// Processes the exchange and shuts the writer down.
    ///
    /// A request that fails to parse is answered with `400 Bad Request` unless
    /// the failure came from the transport itself. The error is still returned
    /// so the caller can log it.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let request = match self.reader.read_request().await {
            Ok(request) => request,
            Err(e) => {
                if !e.is_io() {
                    warn!(cause = %e, "can't parse request");
                    if let Err(send_error) = self.send_parse_error(&e).await {
                        warn!(cause = %send_error, "failed to send the bad request response");
                    }
                }
                if let Err(close_error) = self.writer.close().await {
                    warn!(cause = %close_error, "failed to close connection after a parse error");
                }
                return Err(e.into());
            }
        };

        info!(method = %request.method(), path = request.target(), "received request");
        let result = self.handle(&request, handler.as_ref()).await;

        if !self.writer.is_done() {
            warn!(state = ?self.writer.state(), "handler left the response incomplete");
        }
        self.writer.close().await?;
        result
    }

    async fn handle<H>(&mut self, request: &Request, handler: &H) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let Err(e) = handler.call(request, &mut self.writer).await else {
            return Ok(());
        };

        if self.writer.state() == WriterState::StatusLine {
            warn!(status = %e.status(), message = e.message(), "handler failed, sending error response");
            let status = if reason_phrase(e.status()).is_some() { e.status() } else { StatusCode::INTERNAL_SERVER_ERROR };
            self.send_text(status, e.message()).await?;
            Ok(())
        } else {
            error!(status = %e.status(), message = e.message(), state = ?self.writer.state(), "handler failed after the response was started");
            Err(e.into())
        }
    }

    async fn send_parse_error(&mut self, e: &ParseError) -> Result<(), SendError> {
        self.send_text(StatusCode::BAD_REQUEST, &format!("Error parsing request: {e}")).await
    }

    async fn send_text(&mut self, status: StatusCode, message: &str) -> Result<(), SendError> {
        self.writer.write_status_line(status).await?;
        self.writer.write_headers(&default_headers(message.len())).await?;
        self.writer.write_body(message.as_bytes()).await?;
        self.writer.write_trailers(&Headers::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::HandlerError;
    use async_trait::async_trait;
    use indoc::indoc;
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::{Context, Poll};

    fn crlf(s: &str) -> String {
        s.replace('\n', "\r\n")
    }

    async fn run<H: Handler>(input: &[u8], handler: H) -> (Result<(), HttpError>, String) {
        let mut output = Vec::new();
        let result = HttpConnection::new(input, &mut output).process(Arc::new(handler)).await;
        (result, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn handler_response_is_written() {
        let handler = make_handler(|request: Request| async move {
            Ok::<_, HandlerError>((StatusCode::OK, format!("{} {}", request.method(), request.target())))
        });

        let (result, output) = run(b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n", handler).await;

        assert!(result.is_ok());
        let expected = crlf(indoc! {"
            HTTP/1.1 200 OK
            content-length: 11
            connection: close
            content-type: text/plain

        "}) + "GET /coffee";
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn parse_error_is_answered_with_bad_request() {
        let handler = make_handler(|_: Request| async { Ok::<_, HandlerError>((StatusCode::OK, String::new())) });

        let (result, output) = run(b"GET /coffee HTTP/1.0\r\n\r\n", handler).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::InvalidVersion { .. } })));
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.ends_with("\r\n\r\nError parsing request: unrecognised http version: 1.0"), "{output}");
    }

    #[tokio::test]
    async fn handler_error_before_writing_sets_status() {
        let handler = make_handler(|_: Request| async { Err::<(StatusCode, String), _>(HandlerError::bad_request("no coffee here")) });

        let (result, output) = run(b"GET /tea HTTP/1.1\r\n\r\n", handler).await;

        assert!(result.is_ok());
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\ncontent-length: 14\r\n"));
        assert!(output.ends_with("no coffee here"));
    }

    struct HalfWritten;

    #[async_trait]
    impl Handler for HalfWritten {
        async fn call<W>(&self, _request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
        where
            W: AsyncWrite + Unpin + Send,
        {
            writer.write_status_line(StatusCode::OK).await?;
            Err(HandlerError::internal("gave up"))
        }
    }

    #[tokio::test]
    async fn handler_error_after_status_line_is_returned() {
        let (result, output) = run(b"GET / HTTP/1.1\r\n\r\n", HalfWritten).await;

        assert!(matches!(result, Err(HttpError::HandlerError { .. })));
        assert_eq!(output, "HTTP/1.1 200 OK\r\n");
    }

    /// Refuses every write but records whether it was shut down.
    struct BrokenSink {
        shut_down: Arc<AtomicBool>,
    }

    impl AsyncWrite for BrokenSink {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            self.shut_down.store(true, Ordering::SeqCst);
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn parse_error_survives_failed_reply() {
        let shut_down = Arc::new(AtomicBool::new(false));
        let sink = BrokenSink { shut_down: Arc::clone(&shut_down) };
        let handler = make_handler(|_: Request| async { Ok::<_, HandlerError>((StatusCode::OK, String::new())) });

        let input: &[u8] = b"GET /coffee HTTP/1.0\r\n\r\n";
        let result = HttpConnection::new(input, sink).process(Arc::new(handler)).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::InvalidVersion { .. } })));
        assert!(shut_down.load(Ordering::SeqCst));
    }
}
