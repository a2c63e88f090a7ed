//! The demo application served by `httpserver`.

use async_trait::async_trait;
use http::{HeaderName, HeaderValue, StatusCode, header};
use sha2::{Digest, Sha256};
use tcp_http::connection::{ResponseWriter, chunked_headers, declare_trailers, default_headers};
use tcp_http::handler::Handler;
use tcp_http::protocol::{HandlerError, Headers, Request};
use tokio::io::AsyncWrite;
use tracing::{debug, info};

/// Upper bound for `/stream/{n}`.
pub const MAX_STREAM_LINES: usize = 100;

const X_CONTENT_LENGTH: HeaderName = HeaderName::from_static("x-content-length");
const X_CONTENT_SHA256: HeaderName = HeaderName::from_static("x-content-sha256");

const OK_PAGE: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>";

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const INTERNAL_ERROR_PAGE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>";

const NOT_FOUND_PAGE: &str = "<html>
  <head>
    <title>404 Not Found</title>
  </head>
  <body>
    <h1>Not Found</h1>
    <p>Nothing lives here.</p>
  </body>
</html>";

/// Dispatches on the exact request target.
///
/// | target          | response                                        |
/// |-----------------|-------------------------------------------------|
/// | `/`             | 200, HTML                                       |
/// | `/yourproblem`  | 400, HTML                                       |
/// | `/myproblem`    | 500, HTML                                       |
/// | `/stream/{n}`   | 200, `n` JSON lines, chunked, with trailers     |
/// | `/echo`         | 200, the request body                           |
/// | anything else   | 404, HTML                                       |
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Handler for Router {
    async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = request.target();
        debug!(path = target, "routing request");

        match target {
            "/" => write_html(writer, StatusCode::OK, OK_PAGE).await,
            "/yourproblem" => write_html(writer, StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE).await,
            "/myproblem" => write_html(writer, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_PAGE).await,
            "/echo" => echo(request, writer).await,
            _ => match target.strip_prefix("/stream/") {
                Some(count) => stream(target, count, writer).await,
                None => write_html(writer, StatusCode::NOT_FOUND, NOT_FOUND_PAGE).await,
            },
        }
    }
}

async fn write_html<W>(writer: &mut ResponseWriter<W>, status: StatusCode, page: &str) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(page.len());
    headers.replace(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    writer.write_trailers(&Headers::new()).await?;
    Ok(())
}

async fn echo<W>(request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let body = request.body();
    let mut headers = default_headers(body.len());
    if let Some(content_type) = request.headers().get(header::CONTENT_TYPE) {
        headers.replace(header::CONTENT_TYPE, content_type.clone());
    }

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(body).await?;
    writer.write_trailers(&Headers::new()).await?;
    Ok(())
}

/// Streams `count` JSON lines as separate chunks, then announces the body
/// length and SHA-256 digest in the trailers.
async fn stream<W>(target: &str, count: &str, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let count = parse_line_count(count)?;

    let mut headers = chunked_headers();
    headers.replace(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    declare_trailers(&mut headers, &[X_CONTENT_LENGTH, X_CONTENT_SHA256]);

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut content_length = 0;
    for id in 0..count {
        let line = format!("{{\"id\": {id}, \"url\": \"{target}\"}}\n");
        hasher.update(line.as_bytes());
        content_length += writer.write_chunked_body(line.as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;

    let digest = hex::encode(hasher.finalize());
    let mut trailers = Headers::new();
    trailers.set(X_CONTENT_LENGTH, HeaderValue::from(content_length));
    trailers.set(X_CONTENT_SHA256, HeaderValue::try_from(digest).map_err(HandlerError::internal)?);
    writer.write_trailers(&trailers).await?;

    info!(lines = count, content_length, "finished streaming");
    Ok(())
}

fn parse_line_count(count: &str) -> Result<usize, HandlerError> {
    match count.parse::<usize>() {
        Ok(count) if count <= MAX_STREAM_LINES => Ok(count),
        _ => Err(HandlerError::bad_request(format!("line count must be a number between 0 and {MAX_STREAM_LINES}, got {count:?}"))),
    }
}
