//! Request handlers.
//!
//! A [`Handler`] receives a fully parsed [`Request`] and produces the response
//! itself through a [`ResponseWriter`]. Returning a [`HandlerError`] before
//! anything was written lets the connection answer with that error's status.

use async_trait::async_trait;
use http::StatusCode;
use tokio::io::AsyncWrite;

use crate::connection::{ResponseWriter, default_headers};
use crate::protocol::{HandlerError, Headers, Request};

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send;
}

/// Adapts a function that answers with a status and a plain text body.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(StatusCode, String), HandlerError>> + Send,
{
    async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let (status, body) = (self.f)(request.clone()).await?;

        writer.write_status_line(status).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body.as_bytes()).await?;
        writer.write_trailers(&Headers::new()).await?;
        Ok(())
    }
}

pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future<Output = Result<(StatusCode, String), HandlerError>>,
{
    HandlerFn { f }
}
