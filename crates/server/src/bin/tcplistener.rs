use tcp_http::connection::RequestReader;
use tcp_http_server::{RequestReport, opts};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let args = opts::parse_clap("tcplistener", "Parses one HTTP/1.1 request per connection and prints it");

    let subscriber = FmtSubscriber::builder().with_max_level(args.log_level).with_writer(std::io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return;
    }

    let tcp_listener = match TcpListener::bind(args.address).await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };
    info!(address = %args.address, "start listening");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let accepted = tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!(cause = %e, "failed to listen for shutdown signal");
                }
                break;
            }
            accepted = tcp_listener.accept() => accepted,
        };

        match accepted {
            Ok((tcp_stream, remote_addr)) => {
                info!(%remote_addr, "accepted connection");
                tokio::spawn(inspect(tcp_stream));
            }
            Err(e) => warn!(cause = %e, "failed to accept"),
        }
    }

    info!("stopped listening");
}

async fn inspect(tcp_stream: TcpStream) {
    let mut reader = RequestReader::new(tcp_stream);
    match reader.read_request().await {
        // a single print keeps concurrent reports from interleaving
        Ok(request) => print!("{}", RequestReport(&request)),
        Err(e) => warn!(cause = %e, state = ?reader.state(), "can't parse request"),
    }
    info!("connection closed");
}
