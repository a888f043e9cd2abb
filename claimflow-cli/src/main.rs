mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use claimflow_pipeline::DocumentPipeline;
use claimflow_runner::{
    s3_store, EventRunner, EventRunnerConfig, HandlerResponse, LocalRunner, StorageEvent,
};
use tokio::io::AsyncReadExt;
use tracing::info;

use args::{Cli, Command, HandleEventArgs, PipelineArgs, ProcessArgs};

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_pipeline(args: &PipelineArgs) -> Result<DocumentPipeline> {
    let invoker = args
        .invoker()
        .await
        .context("invalid model client configuration")?;
    let pipeline = DocumentPipeline::new(invoker, args.stage_models())?
        .with_comparison(args.comparison());
    info!(models = ?pipeline.models(), "pipeline configured");
    Ok(pipeline)
}

async fn process(args: ProcessArgs) -> Result<ExitCode> {
    let runner = LocalRunner::new(build_pipeline(&args.pipeline).await?);
    let processed = runner
        .run(&args.input, args.output.as_deref())
        .await
        .with_context(|| format!("failed to process {}", args.input.display()))?;

    match &args.output {
        Some(output) => println!("Results saved to: {}", output.display()),
        None => println!("{}", processed.to_pretty_json()?),
    }
    Ok(ExitCode::SUCCESS)
}

async fn read_event(source: &str) -> Result<StorageEvent> {
    let raw = if source == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("failed to read event from stdin")?;
        raw
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read event file {source}"))?
    };
    serde_json::from_str(&raw).context("malformed storage event")
}

async fn dispatch_event(args: &HandleEventArgs) -> Result<HandlerResponse> {
    let (input_bucket, output_bucket) = args.buckets()?;
    let event = read_event(&args.event).await?;
    let region = args.pipeline.region.as_str();
    let runner = EventRunner::new(
        build_pipeline(&args.pipeline).await?,
        s3_store(input_bucket, region)?,
        s3_store(output_bucket, region)?,
        EventRunnerConfig::new(input_bucket, output_bucket)
            .with_input_prefix(args.input_prefix.as_str()),
    );
    Ok(runner.handle(&event).await)
}

async fn handle_event(args: HandleEventArgs) -> Result<ExitCode> {
    let response = match dispatch_event(&args).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(error = ?err, "event handling failed before processing");
            HandlerResponse::failed(format!("{err:#}"))
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => process(args).await,
        Command::HandleEvent(args) => handle_event(args).await,
    }
}
