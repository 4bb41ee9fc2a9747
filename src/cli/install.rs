use std::process::ExitCode;

use clap::Args;

use crate::catalog::registry::ToolCatalog;
use crate::cli::{run_workflow, Context, OutputFormat};
use crate::utils::validation::split_comma_list;
use crate::validation::pipeline::CommonArgs;
use crate::validation::policy::InstallPolicy;

#[derive(Args)]
pub struct InstallArgs {
    /// Comma-separated tools to install (e.g. checkm2,drep or genome or all)
    #[arg(long)]
    pub tools: Option<String>,

    /// Comma-separated databases to install (e.g. checkm2 or annotation or all)
    #[arg(long)]
    pub databases: Option<String>,

    /// Show what would be installed without executing
    #[arg(long)]
    pub dry_run: bool,

    /// List all available tools, groups and databases
    #[arg(long)]
    pub list_available: bool,
}

pub fn run(args: InstallArgs, ctx: &Context) -> anyhow::Result<ExitCode> {
    if args.list_available {
        list_available(ctx.format)?;
        return Ok(ExitCode::SUCCESS);
    }

    let policy = InstallPolicy {
        tools: args.tools.as_deref().map(split_comma_list).unwrap_or_default(),
        databases: args
            .databases
            .as_deref()
            .map(split_comma_list)
            .unwrap_or_default(),
    };
    let common = CommonArgs {
        dry_run: args.dry_run,
        ..Default::default()
    };
    run_workflow(&policy, &common, ctx)
}

fn list_available(format: OutputFormat) -> anyhow::Result<()> {
    let catalog = ToolCatalog::builtin();
    match format {
        OutputFormat::Text => println!("{}", catalog.summary()),
        OutputFormat::Json => {
            let tools: Vec<serde_json::Value> = catalog
                .tools()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "database": t.database.map(|d| serde_json::json!({
                            "directory": d.directory,
                            "size_gb": d.size_gb,
                        })),
                    })
                })
                .collect();
            let groups: serde_json::Map<String, serde_json::Value> = catalog
                .groups()
                .iter()
                .map(|g| (g.name.to_string(), serde_json::json!(g.members)))
                .collect();
            let output = serde_json::json!({
                "tools": tools,
                "groups": groups,
                "databases": catalog.database_names(),
                "wildcard": crate::catalog::registry::WILDCARD,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
