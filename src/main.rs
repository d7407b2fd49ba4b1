use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use state_guard::field::CheckLevel;
use state_guard::{
    create_replay_span, generate_correlation_id, init_telemetry, DescriptorFormat,
    FieldDescriptor, GuardConfig, GuardError, Model, StateValue, TransitionGuard,
};

#[derive(Parser)]
#[command(name = "state-guard")]
#[command(about = "Check and exercise workflow-constrained state fields")]
#[command(long_about = "state-guard loads field descriptors (TOML or JSON), validates their workflow \
                       tables and replays state assignments against them.")]
struct Cli {
    /// Extra configuration file layered over state-guard.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run field and workflow checks on one or more field descriptors
    Check {
        #[arg(required = true, help = "Descriptor files (.toml or .json)")]
        files: Vec<PathBuf>,
    },
    /// Print the canonical descriptor for a field
    Describe {
        file: PathBuf,
        #[arg(long, default_value = "json", help = "Output format: json or toml")]
        format: String,
    },
    /// Assign states in order to a fresh record, stopping at the first rejection
    Replay {
        file: PathBuf,
        #[arg(required = true)]
        states: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_telemetry(&config.observability) {
        eprintln!("warning: telemetry not initialized: {:#}", e);
    }

    let outcome = match cli.command {
        Commands::Check { files } => check_command(&files, &config),
        Commands::Describe { file, format } => describe_command(&file, &format),
        Commands::Replay { file, states } => replay_command(&file, &states),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<GuardConfig> {
    match explicit {
        Some(path) => {
            GuardConfig::load_env_file()?;
            GuardConfig::load(Some(path))
        }
        None => Ok(state_guard::config()?.clone()),
    }
}

fn load_guard(file: &Path) -> Result<TransitionGuard> {
    let descriptor = FieldDescriptor::load(file)
        .with_context(|| format!("loading descriptor {}", file.display()))?;
    Ok(TransitionGuard::from_descriptor(&descriptor)?)
}

fn check_command(files: &[PathBuf], config: &GuardConfig) -> Result<bool> {
    let strict = config.validation.warnings_as_errors;
    let mut passed = true;

    for file in files {
        let guard = load_guard(file)?;
        let findings = guard.check();

        if findings.is_empty() {
            println!("{}: ok", file.display());
            continue;
        }
        for finding in &findings {
            println!("{}: {}", file.display(), finding);
            if let Some(hint) = &finding.hint {
                println!("    HINT: {}", hint);
            }
        }
        let errors = findings.iter().filter(|f| f.level == CheckLevel::Error).count();
        let warnings = findings.len() - errors;
        println!("{}: {} error(s), {} warning(s)", file.display(), errors, warnings);

        if findings.iter().any(|f| f.is_fatal(strict)) {
            passed = false;
        }
    }

    Ok(passed)
}

fn describe_command(file: &Path, format: &str) -> Result<bool> {
    let format = DescriptorFormat::parse(format)?;
    let guard = load_guard(file)?;
    println!("{}", guard.describe().encode(format)?);
    Ok(true)
}

fn replay_command(file: &Path, states: &[String]) -> Result<bool> {
    let guard = load_guard(file)?;
    let field = guard.name().to_string();
    let kind = guard.kind();
    let model = Model::new("replay").with_field(guard);
    let correlation_id = generate_correlation_id();
    let span = create_replay_span(&field, model.name(), &correlation_id);
    let _enter = span.enter();

    let mut record = model.instance();
    for raw in states {
        let proposed = StateValue::parse(&kind, raw)
            .with_context(|| format!("'{}' is not a valid {} state", raw, kind.field_path()))?;
        match model.set(&mut record, &field, proposed) {
            Ok(()) => println!("accepted {}", raw),
            Err(GuardError::Transition(rejected)) => {
                println!("rejected {}", rejected);
                let allowed: Vec<String> = model
                    .field(&field)?
                    .allowed_targets(rejected.current.as_ref())
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("    allowed next: [{}]", allowed.join(", "));
                return Ok(false);
            }
            Err(other) => return Err(other.into()),
        }
    }

    match model.get(&record, &field)? {
        Some(state) => println!("final state: {}", state),
        None => println!("final state: <unset>"),
    }
    Ok(true)
}
