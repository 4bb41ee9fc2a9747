use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use crate::cli::{run_workflow, Context, WorkflowArgs};
use crate::validation::policy::AnnotationPolicy;

#[derive(Args)]
pub struct AnnotationArgs {
    /// Input prophage sequences: a FASTA file, prophage workflow results, or a
    /// directory holding All_prophage_sequences.fasta
    #[arg(long, required = true)]
    pub prophage: PathBuf,

    /// Minimum prophage length in bp (500-50000)
    #[arg(long, allow_negative_numbers = true, default_value_t = 5000)]
    pub min_prophage_length: i64,

    /// Comma-separated CheckV quality levels to retain. Valid levels: Complete,
    /// High-quality, Medium-quality, Low-quality, Not-determined
    #[arg(long, default_value = "Complete,High-quality,Medium-quality")]
    pub checkv_quality_levels: String,

    /// Skip detailed annotation (Pharokka + PHOLD) and go straight to clustering
    #[arg(long)]
    pub skip_detailed_annotation: bool,

    /// Structural gene filter: pharokka, phold or combined (pass if either passes)
    #[arg(long, default_value = "combined")]
    pub annotation_filter_mode: String,

    /// Minimum percentage of structural genes from Pharokka (0-100)
    #[arg(long, allow_negative_numbers = true, default_value_t = 10.0)]
    pub pharokka_structural_perc: f64,

    /// Minimum total structural genes from Pharokka (1-20)
    #[arg(long, allow_negative_numbers = true, default_value_t = 3)]
    pub pharokka_structural_total: i64,

    /// Minimum percentage of structural genes from PHOLD (0-100)
    #[arg(long, allow_negative_numbers = true, default_value_t = 10.0)]
    pub phold_structural_perc: f64,

    /// Minimum total structural genes from PHOLD (1-20)
    #[arg(long, allow_negative_numbers = true, default_value_t = 3)]
    pub phold_structural_total: i64,

    /// Minimum ANI for clustering (0-100)
    #[arg(long, allow_negative_numbers = true, default_value_t = 95.0)]
    pub clustering_min_ani: f64,

    /// Minimum coverage for clustering (0-100)
    #[arg(long, allow_negative_numbers = true, default_value_t = 85.0)]
    pub clustering_min_coverage: f64,

    #[command(flatten)]
    pub workflow: WorkflowArgs,
}

pub fn run(args: AnnotationArgs, ctx: &Context) -> anyhow::Result<ExitCode> {
    let policy = AnnotationPolicy {
        min_prophage_length: args.min_prophage_length,
        checkv_quality_levels: args.checkv_quality_levels,
        skip_detailed_annotation: args.skip_detailed_annotation,
        annotation_filter_mode: args.annotation_filter_mode,
        pharokka_structural_perc: args.pharokka_structural_perc,
        pharokka_structural_total: args.pharokka_structural_total,
        phold_structural_perc: args.phold_structural_perc,
        phold_structural_total: args.phold_structural_total,
        clustering_min_ani: args.clustering_min_ani,
        clustering_min_coverage: args.clustering_min_coverage,
    };
    run_workflow(&policy, &args.workflow.into_common(args.prophage), ctx)
}
