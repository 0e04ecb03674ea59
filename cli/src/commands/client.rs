use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use mconnect_common::config::Config;
use mconnect_core::Dispatcher;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::commands::{ClientArgs, OutputFormat};
use crate::terminal::{print, spinner};

pub async fn client(args: ClientArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let cfg = Config::from(&args);
    let connections = cfg.connections;

    let cancel = CancellationToken::new();
    let mut dispatcher = Dispatcher::new(cfg)
        .await?
        .with_cancellation(cancel.clone());
    let target = dispatcher.target();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the run early");
            cancel.cancel();
        }
    });

    let show_progress = args.output == OutputFormat::Txt && !quiet;
    let progress = show_progress.then(|| spinner::start(connections));
    if let Some(progress) = &progress {
        let progress = progress.clone();
        dispatcher = dispatcher.with_progress(Arc::new(move |count| {
            spinner::report_progress(&progress, count)
        }));
    }

    let report = dispatcher.run().await?;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    match args.output {
        OutputFormat::Txt => print::report(&target, &report),
        OutputFormat::Json => {
            let json = serde_json::to_string(&report).context("serializing report")?;
            println!("{json}");
        }
    }

    Ok(ExitCode::from(report.exit_code()))
}
