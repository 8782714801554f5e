use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use form_logic::{
    EngineConfig, FormDefinition, ProcessingContext, RawResponse, SignatureMap,
    SubmissionProcessor,
};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Form submission logic engine CLI",
    long_about = "Runs recorded form submissions through reconciliation, logic visibility and field validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a submission and print the annotated responses.
    Process {
        /// Path to the FormDefinition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to a JSON array of raw responses.
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
        /// Optional JSON object mapping field ids to verification signatures.
        #[arg(long, value_name = "SIGNATURES")]
        signatures: Option<PathBuf>,
        /// Optional engine configuration JSON.
        #[arg(long, value_name = "CONFIG")]
        config: Option<PathBuf>,
        /// Submission time (RFC 3339); defaults to now.
        #[arg(long, value_name = "TIMESTAMP")]
        submitted_at: Option<String>,
    },
    /// Print the ids of the fields visible for a set of responses.
    Visibility {
        /// Path to the FormDefinition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Path to a JSON array of raw responses.
        #[arg(long, value_name = "RESPONSES")]
        responses: PathBuf,
    },
    /// Print the JSON schema of the form definition format.
    Schema,
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Process {
            form,
            responses,
            signatures,
            config,
            submitted_at,
        } => run_process(form, responses, signatures, config, submitted_at),
        Command::Visibility { form, responses } => run_visibility(form, responses),
        Command::Schema => run_schema(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    serde_json::from_str(&contents)
        .map_err(|err| format!("failed to parse {}: {}", path.display(), err).into())
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {}", path.display(), err))?,
        None => String::new(),
    };
    Ok(EngineConfig::from_json_str(&raw)?.with_env_overrides())
}

fn parse_submitted_at(raw: Option<&str>) -> CliResult<ProcessingContext> {
    match raw {
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(raw)
                .map_err(|err| format!("invalid --submitted-at '{}': {}", raw, err))?;
            Ok(ProcessingContext::at(parsed.with_timezone(&Utc)))
        }
        None => Ok(ProcessingContext::now()),
    }
}

fn run_process(
    form_path: PathBuf,
    responses_path: PathBuf,
    signatures_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    submitted_at: Option<String>,
) -> CliResult<()> {
    let form: FormDefinition = read_json(&form_path)?;
    let responses: Vec<RawResponse> = read_json(&responses_path)?;
    let signatures: Option<SignatureMap> = signatures_path
        .as_deref()
        .map(read_json::<SignatureMap>)
        .transpose()?;
    let config = load_config(config_path.as_deref())?;
    let ctx = parse_submitted_at(submitted_at.as_deref())?;
    tracing::debug!(
        form_id = %form.id,
        responses = responses.len(),
        signatures = signatures.as_ref().map_or(0, |map| map.len()),
        "loaded submission"
    );

    let processor = SubmissionProcessor::new(config)?;
    match processor.process(&form, responses, signatures.as_ref(), ctx) {
        Ok(submission) => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error.to_report())?);
            Err(format!("submission rejected: {}", error.code()).into())
        }
    }
}

fn run_visibility(form_path: PathBuf, responses_path: PathBuf) -> CliResult<()> {
    let form: FormDefinition = read_json(&form_path)?;
    let responses: Vec<RawResponse> = read_json(&responses_path)?;
    let processor = SubmissionProcessor::new(EngineConfig::default())?;
    match processor.visibility(&form, responses) {
        Ok(visible) => {
            println!("{}", serde_json::to_string_pretty(&visible)?);
            Ok(())
        }
        Err(error) => {
            println!("{}", serde_json::to_string_pretty(&error.to_report())?);
            Err(format!("visibility failed: {}", error.code()).into())
        }
    }
}

fn run_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(FormDefinition);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
