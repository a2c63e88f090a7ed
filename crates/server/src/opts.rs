//! Command line shared by the `httpserver` and `tcplistener` binaries.

use std::net::SocketAddr;

use clap::{Arg, ArgMatches, Command, value_parser};
use tracing::Level;

const ARGS_ADDRESS: &str = "address";
const ARGS_LOG_LEVEL: &str = "log-level";

const DEFAULT_ADDRESS: &str = "127.0.0.1:42069";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug)]
pub struct ProcArgs {
    pub address: SocketAddr,
    pub log_level: Level,
}

fn build_cli_args(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .version(env!("CARGO_PKG_VERSION"))
        .about(about)
        .arg(
            Arg::new(ARGS_ADDRESS)
                .help("Address to listen on")
                .num_args(1)
                .value_name("ADDRESS")
                .value_parser(value_parser!(SocketAddr))
                .default_value(DEFAULT_ADDRESS)
                .short('a')
                .long("address"),
        )
        .arg(
            Arg::new(ARGS_LOG_LEVEL)
                .help("Maximum log level")
                .num_args(1)
                .value_name("LEVEL")
                .value_parser(value_parser!(Level))
                .default_value(DEFAULT_LOG_LEVEL)
                .short('l')
                .long("log-level"),
        )
}

fn from_matches(args: &ArgMatches) -> ProcArgs {
    // both arguments carry a default value
    let address = args.get_one::<SocketAddr>(ARGS_ADDRESS).copied().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 42069)));
    let log_level = args.get_one::<Level>(ARGS_LOG_LEVEL).copied().unwrap_or(Level::INFO);
    ProcArgs { address, log_level }
}

pub fn parse_clap(name: &'static str, about: &'static str) -> ProcArgs {
    from_matches(&build_cli_args(name, about).get_matches())
}
