use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use vnconv::shutdown::cancel_on_signal;
use vnconv::{
    CliArgs, ConvertConfig, ConvertError, LoggingConfig, Processor, init_logging, open_workbook,
};

#[tokio::main]
async fn main() -> ExitCode {
    match convert().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    }
}

/// Run failures exit with their [`vnconv::ErrorCode`]; anything else with 1.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<ConvertError>()
        .map_or(ExitCode::FAILURE, |e| ExitCode::from(e.exit_status()))
}

async fn convert() -> anyhow::Result<()> {
    let _guard = init_logging(LoggingConfig::from_env())?;

    let cli = CliArgs::parse();
    let json = cli.json;
    let config = ConvertConfig::from_args(cli)?;

    let document = open_workbook(&config.input).await?;
    let processor = Processor::new(
        document,
        config.input.clone(),
        config.transformer(),
        config.processor_options(),
    );

    let mut progress = processor.subscribe_progress();
    let progress_task = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let current = *progress.borrow_and_update();
            tracing::trace!(processed = current.processed, failed = current.failed, "progress");
        }
    });

    let cancel = CancellationToken::new();
    let signals = cancel_on_signal(cancel.clone());
    let result = processor.run(cancel.clone()).await;
    cancel.cancel();
    let _ = signals.await;
    let _ = progress_task.await;

    let outcome = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    } else {
        println!("{}", outcome.output_path.display());
        if outcome.cancelled() {
            eprintln!("conversion cancelled; partial output saved");
        }
        if !outcome.report.failures.is_empty() {
            eprintln!("{} cell(s) could not be converted", outcome.report.failures.len());
        }
    }
    Ok(())
}
