use tcp_http_server::{Router, Server, opts};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let args = opts::parse_clap("httpserver", "Serves the demo routes over HTTP/1.1, one request per connection");

    let subscriber = FmtSubscriber::builder().with_max_level(args.log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return;
    }

    let server = match Server::builder().address(args.address).handler(Router::new()).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server config");
            return;
        }
    };

    let handle = match server.serve().await {
        Ok(handle) => handle,
        Err(e) => {
            error!(cause = %e, "failed to start server");
            return;
        }
    };
    info!(local_addr = %handle.local_addr(), "server started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "failed to listen for shutdown signal");
    }

    handle.close();
    handle.stopped().await;
    info!("server gracefully stopped");
}
