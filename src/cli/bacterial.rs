use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use crate::cli::{run_workflow, Context, WorkflowArgs};
use crate::validation::policy::GenomeQcPolicy;

#[derive(Args)]
pub struct BacterialArgs {
    /// Input genome file or directory containing .fa, .fasta, or .fna files
    #[arg(long, required = true)]
    pub genome: PathBuf,

    /// CheckM2 completeness threshold (0-100) [default: from nextflow.config, else 95]
    #[arg(long, allow_negative_numbers = true)]
    pub completeness_threshold: Option<f64>,

    /// CheckM2 contamination threshold (0-100) [default: from nextflow.config, else 5]
    #[arg(long, allow_negative_numbers = true)]
    pub contamination_threshold: Option<f64>,

    /// dRep ANI threshold (0-1) [default: from nextflow.config, else 0.999]
    #[arg(long, allow_negative_numbers = true)]
    pub drep_ani_threshold: Option<f64>,

    #[command(flatten)]
    pub workflow: WorkflowArgs,
}

pub fn run(args: BacterialArgs, ctx: &Context) -> anyhow::Result<ExitCode> {
    let policy = GenomeQcPolicy {
        completeness_threshold: args.completeness_threshold,
        contamination_threshold: args.contamination_threshold,
        drep_ani_threshold: args.drep_ani_threshold,
    };
    run_workflow(&policy, &args.workflow.into_common(args.genome), ctx)
}
