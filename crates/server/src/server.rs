use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tcp_http::connection::HttpConnection;
use tcp_http::handler::Handler;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct ServerBuilder<H> {
    handler: Option<Arc<H>>,
    address: Option<io::Result<Vec<SocketAddr>>>,
}

impl<H> ServerBuilder<H>
where
    H: Handler + 'static,
{
    fn new() -> Self {
        Self { handler: None, address: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server<H>, ServerError> {
        let handler = self.handler.ok_or(ServerError::MissingHandler)?;
        let address = self.address.ok_or(ServerError::MissingAddress)?.map_err(|source| ServerError::InvalidAddress { source })?;
        if address.is_empty() {
            return Err(ServerError::MissingAddress);
        }
        Ok(Server { handler, address })
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
    #[error("bind server error: {source}")]
    Bind { source: io::Error },
}

/// Accepts TCP connections and runs one [`HttpConnection`] per connection.
#[derive(Debug)]
pub struct Server<H> {
    handler: Arc<H>,
    address: Vec<SocketAddr>,
}

impl<H> Server<H>
where
    H: Handler + 'static,
{
    pub fn builder() -> ServerBuilder<H> {
        ServerBuilder::new()
    }

    /// Binds the listener and starts accepting in a background task.
    pub async fn serve(self) -> Result<ServerHandle, ServerError> {
        let tcp_listener = TcpListener::bind(self.address.as_slice()).await.map_err(|source| ServerError::Bind { source })?;
        let local_addr = tcp_listener.local_addr().map_err(|source| ServerError::Bind { source })?;
        info!(%local_addr, "start listening");

        let closed = Arc::new(AtomicBool::new(false));
        let wakeup = Arc::new(Notify::new());
        let accept_task = tokio::spawn(accept_loop(tcp_listener, self.handler, Arc::clone(&closed), Arc::clone(&wakeup)));

        Ok(ServerHandle { local_addr, closed, wakeup, accept_task })
    }
}

async fn accept_loop<H>(tcp_listener: TcpListener, handler: Arc<H>, closed: Arc<AtomicBool>, wakeup: Arc<Notify>)
where
    H: Handler + 'static,
{
    loop {
        let accepted = tokio::select! {
            () = wakeup.notified() => break,
            accepted = tcp_listener.accept() => accepted,
        };

        if closed.load(Ordering::Acquire) {
            break;
        }

        match accepted {
            Ok((tcp_stream, remote_addr)) => {
                debug!(%remote_addr, "accepted connection");
                tokio::spawn(handle_connection(tcp_stream, Arc::clone(&handler)));
            }
            Err(e) => warn!(cause = %e, "failed to accept"),
        }
    }

    info!("stopped accepting connections");
}

async fn handle_connection<H>(tcp_stream: TcpStream, handler: Arc<H>)
where
    H: Handler + 'static,
{
    let (reader, writer) = tcp_stream.into_split();
    let connection = HttpConnection::new(reader, writer);
    match connection.process(handler).await {
        Ok(()) => info!("finished process, connection shutdown"),
        Err(e) => error!(cause = %e, "service has error, connection shutdown"),
    }
}

/// Controls a running [`Server`].
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    wakeup: Arc<Notify>,
    accept_task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting new connections. Connections already accepted run to
    /// completion. Calling this more than once has no further effect.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(local_addr = %self.local_addr, "closing server");
            // stores a permit if the loop is not waiting right now
            self.wakeup.notify_one();
        }
    }

    /// Waits until the accept loop has exited and the listener is released.
    pub async fn stopped(self) {
        if let Err(e) = self.accept_task.await {
            error!(cause = %e, "accept loop terminated abnormally");
        }
    }
}
