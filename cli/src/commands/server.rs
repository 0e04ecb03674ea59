use anyhow::Context;
use mconnect_common::config::ResponderConfig;
use mconnect_core::Responder;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::commands::ServerArgs;

pub async fn server(args: ServerArgs) -> anyhow::Result<()> {
    let identity = match args.identity {
        Some(identity) => identity,
        None => sys_info::hostname().context("reading hostname")?,
    };

    let cfg = ResponderConfig {
        address: args.address,
        identity,
        datagram: args.udp,
    };
    let responder = Responder::bind(&cfg).await?;

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shutdown.cancel();
        }
    });

    responder.serve(token).await
}
