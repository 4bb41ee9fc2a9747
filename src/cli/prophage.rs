use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use crate::cli::{run_workflow, Context, WorkflowArgs};
use crate::validation::policy::ProphagePolicy;

#[derive(Args)]
pub struct ProphageArgs {
    /// Input genome file or directory (accepts bacterial workflow results)
    #[arg(long, required = true)]
    pub genome: PathBuf,

    /// Disable geNomad prophage detection
    #[arg(long)]
    pub skip_genomad: bool,

    /// Disable VIBRANT prophage detection
    #[arg(long)]
    pub skip_vibrant: bool,

    /// geNomad sensitivity preset: default, conservative or relaxed [default: pipeline default]
    #[arg(long)]
    pub genomad_preset: Option<String>,

    /// VIBRANT minimum scaffold length in bp (500-50000) [default: pipeline default]
    #[arg(long, allow_negative_numbers = true)]
    pub vibrant_min_length: Option<i64>,

    #[command(flatten)]
    pub workflow: WorkflowArgs,
}

pub fn run(args: ProphageArgs, ctx: &Context) -> anyhow::Result<ExitCode> {
    let policy = ProphagePolicy {
        skip_genomad: args.skip_genomad,
        skip_vibrant: args.skip_vibrant,
        genomad_preset: args.genomad_preset,
        vibrant_min_length: args.vibrant_min_length,
    };
    run_workflow(&policy, &args.workflow.into_common(args.genome), ctx)
}
