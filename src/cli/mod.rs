//! Command-line interface for phorager.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **bacterial**: Bacterial genome quality control and dereplication
//! - **prophage**: Prophage detection in bacterial genomes
//! - **annotation**: Prophage quality filtering, annotation and clustering
//! - **install**: Install tools and databases
//! - **config**: Show or change the persistent configuration
//!
//! Every workflow command validates its input, parameters and databases
//! before anything is started, and prints the full plan with `--dry-run`.
//!
//! ## Usage
//!
//! ```text
//! # Configure once
//! phorager config set --backend conda --db-location /data/phorager/db
//!
//! # Install what the prophage workflow needs
//! phorager install --tools prophage --databases prophage
//!
//! # Detect prophages, then annotate the prophage results
//! phorager prophage --genome genomes/ --outdir run1
//! phorager annotation --prophage run1 --outdir run1_annotation
//!
//! # Show the engine command without running it
//! phorager annotation --prophage run1 --dry-run --format json
//! ```

use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use crate::config::store::{ConfigError, ConfigStore};
use crate::engine::command::Invocation;
use crate::engine::defaults::EngineDefaults;
use crate::utils::validation::absolutize;
use crate::validation::pipeline::{CommonArgs, Validator};
use crate::validation::policy::WorkflowPolicy;

pub mod annotation;
pub mod bacterial;
pub mod config;
pub mod install;
pub mod plan;
pub mod prophage;

#[derive(Parser)]
#[command(name = "phorager")]
#[command(version)]
#[command(about = "Bacterial genome QC, prophage detection and prophage annotation workflows")]
#[command(
    long_about = "phorager validates inputs, parameters and installed databases, then launches the phorager Nextflow pipeline.\n\nWorkflows chain together: the output directory of 'bacterial' is a valid input to 'prophage', and the output directory of 'prophage' is a valid input to 'annotation'."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding config.json [default: ~/.phorager]
    #[arg(long, global = true, env = "PHORAGER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Pipeline directory holding main.nf and nextflow.config [default: directory of this executable]
    #[arg(long, global = true, env = "PHORAGER_PIPELINE_DIR")]
    pub pipeline_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bacterial genome quality control and dereplication
    Bacterial(bacterial::BacterialArgs),

    /// Prophage detection in bacterial genomes
    Prophage(prophage::ProphageArgs),

    /// Prophage quality filtering, annotation and clustering
    Annotation(annotation::AnnotationArgs),

    /// Install tools and databases
    Install(install::InstallArgs),

    /// Manage the persistent configuration
    Config(config::ConfigArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options shared by the bacterial, prophage and annotation commands
#[derive(Args, Debug, Clone)]
pub struct WorkflowArgs {
    /// Output directory [default: outdir from nextflow.config, else "results"]
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Number of threads [default: decided by the pipeline]
    #[arg(long, allow_negative_numbers = true)]
    pub threads: Option<i64>,

    /// Resume a previous run
    #[arg(long)]
    pub resume: bool,

    /// Validate and show the plan without running anything
    #[arg(long)]
    pub dry_run: bool,
}

impl WorkflowArgs {
    #[must_use]
    pub fn into_common(self, input: PathBuf) -> CommonArgs {
        CommonArgs {
            input: Some(input),
            outdir: self.outdir,
            threads: self.threads,
            resume: self.resume,
            dry_run: self.dry_run,
        }
    }
}

/// Global options every command runs with
#[derive(Debug, Clone)]
pub struct Context {
    pub format: OutputFormat,
    pub verbose: bool,
    pub config_dir: Option<PathBuf>,
    pub pipeline_dir: Option<PathBuf>,
}

impl Context {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            verbose: cli.verbose,
            config_dir: cli.config_dir.clone(),
            pipeline_dir: cli.pipeline_dir.clone(),
        }
    }

    /// Configuration store at `--config-dir` or the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDirectory` if no location can be determined.
    pub fn config_store(&self) -> Result<ConfigStore, ConfigError> {
        ConfigStore::open(self.config_dir.clone())
    }

    /// Absolute pipeline directory
    ///
    /// # Errors
    ///
    /// Fails if the current directory or executable path cannot be determined.
    pub fn pipeline_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.pipeline_dir {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            return Ok(absolutize(dir, &cwd));
        }
        let exe = std::env::current_exe().context("Failed to locate the phorager executable")?;
        exe.parent()
            .map(std::path::Path::to_path_buf)
            .context("The phorager executable has no parent directory")
    }
}

/// Validate, assemble and either print the plan or run the engine.
///
/// Returns the engine's exit code, or success for a dry run.
///
/// # Errors
///
/// Any validation failure, or a failure to start the engine.
pub fn run_workflow<P>(policy: &P, common: &CommonArgs, ctx: &Context) -> anyhow::Result<ExitCode>
where
    P: WorkflowPolicy,
    P::Settings: plan::PlanSummary,
{
    let store = ctx.config_store()?;
    if !store.exists() {
        warn!(
            "Configuration file not found at {}; using defaults. Run 'phorager config set' to configure.",
            store.path().display()
        );
    }
    let config = store.load()?;

    let pipeline_dir = ctx.pipeline_dir()?;
    let defaults = EngineDefaults::discover(&pipeline_dir);
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let validated = Validator::new(&config, &defaults, cwd).validate(policy, common)?;
    let invocation = Invocation::assemble(&validated, &pipeline_dir);

    if common.dry_run {
        plan::Plan::new(&validated, &invocation).print(ctx.format)?;
        return Ok(ExitCode::SUCCESS);
    }

    let workflow = validated.workflow;
    let status = invocation.run()?;
    if status.success() {
        if matches!(ctx.format, OutputFormat::Text) {
            println!("\nThe {workflow} workflow completed successfully.");
        }
    } else {
        eprintln!("\nThe {workflow} workflow failed ({status}).");
    }
    Ok(exit_code(status))
}

/// Map an engine exit status onto this process's exit code
fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}
