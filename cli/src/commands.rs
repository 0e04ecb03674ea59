pub mod client;
pub mod server;

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mconnect_common::config::{self, ClosePolicy, Config, Transport};

const ABOUT: &str = "Make many connects towards an address.

The address is supposed to be a virtual address that is load-balanced to many
servers. Statistics per server identity (hostname) are printed on exit. The
purpose is testing of connectivity and load balancing.";

#[derive(Parser)]
#[command(name = "mconnect", version)]
#[command(about = "Connectivity and load-balancing probe.", long_about = ABOUT)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and hide the progress spinner
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe an address and report hits per server identity
    #[command(alias = "c")]
    Client(ClientArgs),
    /// Announce this host's identity to every connection
    #[command(alias = "s")]
    Server(ServerArgs),
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Server address
    #[arg(short, long, default_value = config::DEFAULT_ADDRESS)]
    pub address: String,

    /// Use datagrams (UDP)
    #[arg(long)]
    pub udp: bool,

    /// Number of connections
    #[arg(short, long, default_value_t = 1)]
    pub nconn: usize,

    /// Keep connections open
    #[arg(short, long)]
    pub keep: bool,

    /// Timeout for the whole run, e.g. "5s" or "1m30s"
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Max concurrent connects. Keep below the server's listen backlog
    #[arg(short, long, default_value_t = config::DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Base source CIDR to use
    #[arg(long)]
    pub src_cidr: Option<String>,

    /// Random seed. 0 = init from time
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
    pub output: OutputFormat,

    /// In keep-open mode, do not count a close by the server as a failed read
    #[arg(long)]
    pub clean_close: bool,
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Listen address
    #[arg(short, long, default_value = config::DEFAULT_ADDRESS)]
    pub address: SocketAddr,

    /// Also answer datagrams (UDP) on the same address
    #[arg(long)]
    pub udp: bool,

    /// Identity to announce. Defaults to the hostname
    #[arg(short, long)]
    pub identity: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Txt,
    Json,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl From<&ClientArgs> for Config {
    fn from(args: &ClientArgs) -> Self {
        Config {
            target: args.address.clone(),
            transport: if args.udp {
                Transport::Datagram
            } else {
                Transport::Stream
            },
            connections: args.nconn,
            keep_open: args.keep,
            timeout: args.timeout,
            max_concurrent: args.max_concurrent,
            source_cidr: args.src_cidr.clone(),
            seed: Some(args.seed),
            close_policy: if args.clean_close {
                ClosePolicy::CleanEnd
            } else {
                ClosePolicy::Failure
            },
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn client_args(args: &[&str]) -> ClientArgs {
        let cli = CommandLine::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Client(args) => args,
            Commands::Server(_) => panic!("expected the client subcommand"),
        }
    }

    #[test]
    fn command_line_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn client_defaults() {
        let cfg = Config::from(&client_args(&["mconnect", "client"]));
        assert_eq!(cfg.target, "[::1]:5001");
        assert_eq!(cfg.connections, 1);
        assert_eq!(cfg.max_concurrent, 64);
        assert_eq!(cfg.transport, Transport::Stream);
        assert_eq!(cfg.timeout, None);
        assert_eq!(cfg.explicit_seed(), None);
        assert_eq!(cfg.close_policy, ClosePolicy::Failure);
    }

    #[test]
    fn client_flags_map_to_config() {
        let args = client_args(&[
            "mconnect", "c", "--address", "10.0.0.1:5001", "--udp", "--nconn", "1000",
            "--keep", "--timeout", "1m30s", "--max-concurrent", "16", "--src-cidr",
            "10.200.0.0/16", "--seed", "42", "--output", "json", "--clean-close",
        ]);
        assert_eq!(args.output, OutputFormat::Json);

        let cfg = Config::from(&args);
        assert_eq!(cfg.target, "10.0.0.1:5001");
        assert_eq!(cfg.transport, Transport::Datagram);
        assert_eq!(cfg.connections, 1000);
        assert!(cfg.keep_open);
        assert_eq!(cfg.timeout, Some(Duration::from_secs(90)));
        assert_eq!(cfg.max_concurrent, 16);
        assert_eq!(cfg.source_cidr.as_deref(), Some("10.200.0.0/16"));
        assert_eq!(cfg.explicit_seed(), Some(42));
        assert_eq!(cfg.close_policy, ClosePolicy::CleanEnd);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        assert!(CommandLine::try_parse_from(["mconnect", "client", "--timeout", "soon"]).is_err());
    }

    #[test]
    fn server_flags() {
        let cli = CommandLine::try_parse_from([
            "mconnect", "s", "--address", "0.0.0.0:5001", "--udp", "--identity", "web-1",
        ])
        .unwrap();
        let Commands::Server(args) = cli.command else {
            panic!("expected the server subcommand");
        };
        assert_eq!(args.address, "0.0.0.0:5001".parse::<SocketAddr>().unwrap());
        assert!(args.udp);
        assert_eq!(args.identity.as_deref(), Some("web-1"));
    }
}
