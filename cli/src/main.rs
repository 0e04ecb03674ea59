mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, client, server};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet);

    match commands.command {
        Commands::Client(args) => client::client(args, commands.quiet).await,
        Commands::Server(args) => {
            server::server(args).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
