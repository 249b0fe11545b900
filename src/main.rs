//! hetzner-admission - offline admission check for Hetzner infrastructure manifests.
//!
//! Runs a manifest through the same defaulting and validation an admission
//! webhook would apply and prints the decision as JSON:
//! - exit 0: accepted (the defaulted object is printed)
//! - exit 1: rejected (an `Invalid` status with every violation is printed)
//! - exit 2: bad request or unreadable input

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::{debug, error};

use hetzner_admission::manifest;
use hetzner_admission::{AdmissionObject, AdmissionOutcome, AdmissionWebhook, Error, Operation};

/// Check a Hetzner Cluster API manifest against admission rules
#[derive(Parser, Debug)]
#[command(name = "hetzner-admission", version, about, long_about = None)]
struct Cli {
    /// Manifest to admit ("-" reads stdin). For delete, the existing object.
    file: PathBuf,

    /// Admission operation to simulate
    #[arg(long, value_enum, env = "ADMISSION_OPERATION", default_value = "create")]
    operation: OperationArg,

    /// Manifest of the currently stored object (required for update)
    #[arg(long)]
    old: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OperationArg {
    Create,
    Update,
    Delete,
}

impl From<OperationArg> for Operation {
    fn from(op: OperationArg) -> Self {
        match op {
            OperationArg::Create => Operation::Create,
            OperationArg::Update => Operation::Update,
            OperationArg::Delete => Operation::Delete,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("hetzner_admission=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

fn load(path: &Path) -> hetzner_admission::Result<AdmissionObject> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        manifest::parse_object(&text)
    } else {
        manifest::read_object(path)
    }
}

fn run(cli: &Cli) -> hetzner_admission::Result<AdmissionOutcome> {
    let operation = Operation::from(cli.operation);
    let object = load(&cli.file)?;
    let old = cli.old.as_deref().map(load).transpose()?;
    debug!(kind = %object.kind(), operation = ?operation, "Loaded manifest");

    let webhook = AdmissionWebhook::new(object.kind());
    let admission = match operation {
        Operation::Delete => webhook.admit(operation, None, Some(object))?,
        _ => webhook.admit(operation, Some(object), old)?,
    };

    let report = match &admission.outcome {
        AdmissionOutcome::Accepted { warnings } => {
            let object = admission
                .object
                .as_ref()
                .map(AdmissionObject::to_value)
                .transpose()?;
            json!({ "allowed": true, "warnings": warnings, "object": object })
        }
        AdmissionOutcome::Rejected(rejection) => json!({
            "allowed": false,
            "warnings": rejection.warnings(),
            "status": rejection.to_status(),
        }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(admission.outcome)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.log_format) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(outcome) if outcome.is_accepted() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            error!(error = %e, "Admission check failed");
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}
