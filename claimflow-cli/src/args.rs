use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use claimflow_core::{ClaimflowError, ModelInvoker};
use claimflow_llm::{BedrockClient, RuntimeClient, DEFAULT_REGION};
use claimflow_pipeline::{ComparisonSettings, StageModels};
use claimflow_runner::event::DEFAULT_INPUT_PREFIX;

/// Insurance claim document processing over generative-model endpoints
#[derive(Parser, Debug)]
#[command(name = "claimflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Process a local text file and print or save the JSON result
    Process(ProcessArgs),
    /// Handle an object-store notification and write results to the output bucket
    HandleEvent(HandleEventArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input file path
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Output file path (default: stdout)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct HandleEventArgs {
    /// Notification payload file, or `-` for stdin
    #[arg(long, value_name = "FILE", default_value = "-")]
    pub event: String,

    /// Bucket that documents are expected to arrive in
    #[arg(long, env = "INPUT_BUCKET")]
    pub input_bucket: Option<String>,

    /// Bucket that results are written to
    #[arg(long, env = "OUTPUT_BUCKET")]
    pub output_bucket: Option<String>,

    /// Key prefix stripped from input keys when deriving output keys
    #[arg(long, env = "INPUT_PREFIX", default_value = DEFAULT_INPUT_PREFIX)]
    pub input_prefix: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Model ID for document understanding
    #[arg(long, env = "BEDROCK_MODEL_UNDERSTANDING")]
    pub model_understanding: Option<String>,

    /// Model ID for information extraction
    #[arg(long, env = "BEDROCK_MODEL_EXTRACTION")]
    pub model_extraction: Option<String>,

    /// Model ID for summary generation
    #[arg(long, env = "BEDROCK_MODEL_SUMMARY")]
    pub model_summary: Option<String>,

    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Invocation endpoint base URL (default: the regional runtime endpoint)
    #[arg(long, env = "BEDROCK_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    #[arg(long, env = "AWS_BEARER_TOKEN_BEDROCK", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Transport timeout per model call, in seconds
    #[arg(long, env = "BEDROCK_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Run the comparison models after the pipeline
    #[arg(
        long = "compare",
        env = "ENABLE_MODEL_COMPARISON",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub compare: bool,

    /// Comma-separated model IDs to compare
    #[arg(long, env = "COMPARISON_MODELS", default_value = "")]
    pub comparison_models: String,
}

impl HandleEventArgs {
    /// Input and output bucket names. A missing bucket is reported as a
    /// configuration error so the caller can answer with a failure response.
    pub fn buckets(&self) -> Result<(&str, &str), ClaimflowError> {
        fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, ClaimflowError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|bucket| !bucket.is_empty())
                .ok_or_else(|| ClaimflowError::InvalidConfig(format!("{name} is not set")))
        }

        Ok((
            required(&self.input_bucket, "INPUT_BUCKET")?,
            required(&self.output_bucket, "OUTPUT_BUCKET")?,
        ))
    }
}

impl PipelineArgs {
    pub fn stage_models(&self) -> StageModels {
        StageModels::resolve(
            self.model_understanding.clone(),
            self.model_extraction.clone(),
            self.model_summary.clone(),
        )
    }

    pub fn comparison(&self) -> ComparisonSettings {
        ComparisonSettings::from_list(self.compare, &self.comparison_models)
    }

    fn bearer_token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// Bearer-token client when a token is configured, otherwise a client
    /// signed from the AWS credential chain.
    pub async fn invoker(&self) -> Result<Arc<dyn ModelInvoker>, ClaimflowError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let Some(token) = self.bearer_token() else {
            let runtime =
                RuntimeClient::from_env(&self.region, self.endpoint.as_deref(), timeout).await?;
            return Ok(Arc::new(runtime));
        };

        let mut builder = BedrockClient::builder()
            .region(self.region.as_str())
            .timeout(timeout)
            .bearer_token(token);
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        Ok(Arc::new(builder.build()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_with_overrides() {
        let cli = Cli::try_parse_from([
            "claimflow",
            "process",
            "--input",
            "claim.txt",
            "--model-summary",
            "fast-model",
            "--compare",
            "--comparison-models",
            "a, b,,",
        ])
        .unwrap();

        let Command::Process(args) = cli.command else {
            panic!("expected process command");
        };
        assert_eq!(args.input, PathBuf::from("claim.txt"));
        assert_eq!(args.output, None);
        assert_eq!(args.pipeline.stage_models().summary, "fast-model");
        let comparison = args.pipeline.comparison();
        assert!(comparison.enabled);
        assert_eq!(comparison.models, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn handle_event_reads_stdin_by_default() {
        let parsed = Cli::try_parse_from([
            "claimflow",
            "handle-event",
            "--input-bucket",
            "in",
            "--output-bucket",
            "out",
        ])
        .unwrap();
        let Command::HandleEvent(args) = parsed.command else {
            panic!("expected handle-event command");
        };
        assert_eq!(args.event, "-");
        assert_eq!(args.input_prefix, DEFAULT_INPUT_PREFIX);
        assert_eq!(args.buckets().unwrap(), ("in", "out"));
    }

    #[test]
    fn missing_output_bucket_is_a_configuration_error() {
        let parsed = Cli::try_parse_from([
            "claimflow",
            "handle-event",
            "--input-bucket",
            "in",
            "--output-bucket",
            " ",
        ])
        .unwrap();
        let Command::HandleEvent(args) = parsed.command else {
            panic!("expected handle-event command");
        };
        let err = args.buckets().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("OUTPUT_BUCKET"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
