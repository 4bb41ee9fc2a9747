//! Dry-run plan rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::catalog::registry::ToolCatalog;
use crate::cli::OutputFormat;
use crate::core::types::InputMode;
use crate::database::checker::database_dir;
use crate::engine::command::Invocation;
use crate::validation::pipeline::ValidatedParameters;
use crate::validation::policy::{
    AnnotationSettings, GenomeQcSettings, InstallSettings, ProphageSettings,
};

const NOT_CONFIGURED: &str = "(using pipeline defaults)";

/// Workflow-specific lines of a dry-run plan
pub trait PlanSummary {
    /// `(label, value)` pairs listed under "Parameters"
    fn parameters(&self) -> Vec<(&'static str, String)>;

    /// Extra titled sections placed after the parameters
    fn sections(&self) -> Vec<(String, Vec<String>)> {
        Vec::new()
    }
}

/// Install state of one required database
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub name: String,
    pub path: PathBuf,
    pub installed: bool,
}

/// Everything a dry run reports
#[derive(Debug, Serialize)]
pub struct Plan<'a, S> {
    #[serde(flatten)]
    pub parameters: &'a ValidatedParameters<S>,
    pub databases: Vec<DatabaseStatus>,
    pub command: &'a Invocation,
    pub command_line: String,
}

impl<'a, S: PlanSummary + Serialize> Plan<'a, S> {
    #[must_use]
    pub fn new(parameters: &'a ValidatedParameters<S>, command: &'a Invocation) -> Self {
        let catalog = ToolCatalog::builtin();
        let databases = parameters
            .required_databases
            .iter()
            .filter_map(|name| {
                database_dir(catalog, &parameters.engine.db_location, name).map(|path| {
                    DatabaseStatus {
                        name: name.clone(),
                        installed: path.exists(),
                        path,
                    }
                })
            })
            .collect();

        Self {
            parameters,
            databases,
            command,
            command_line: command.display(),
        }
    }

    /// Print in the requested format
    ///
    /// # Errors
    ///
    /// Fails only if JSON serialization fails.
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Text => print!("{}", self.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
        }
        Ok(())
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        let p = self.parameters;
        let mut out = String::new();

        let title = format!("Phorager {} workflow - dry run", p.workflow);
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}\n", "=".repeat(50));

        if let Some(input) = &p.input {
            let r = &input.resolution;
            let _ = writeln!(out, "Input Detection:");
            let _ = writeln!(out, "  \u{2713} {} detected", describe_mode(r.mode));
            let _ = writeln!(out, "  Input: {}", r.path.display());
            if let Some(marker) = &r.marker {
                let _ = writeln!(out, "  Found: {}", marker.display());
            }
            if matches!(r.mode, InputMode::Directory | InputMode::BacterialWorkflow) {
                let _ = writeln!(out, "  Sequence files: {}", r.sequence_files);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "Configuration:");
        let _ = writeln!(out, "  Backend: {}", p.engine.backend);
        let _ = writeln!(out, "  Database location: {}", p.engine.db_location.display());
        let cache = p
            .engine
            .cache_location
            .as_ref()
            .map_or_else(|| NOT_CONFIGURED.to_string(), |c| c.display().to_string());
        let _ = writeln!(out, "  Cache location: {cache}");
        if let Some(outdir) = &p.output_dir {
            let _ = writeln!(out, "  Output directory: {}", outdir.display());
            let threads = p
                .threads
                .map_or_else(|| "auto-detected".to_string(), |t| t.to_string());
            let _ = writeln!(out, "  Threads: {threads}");
            let _ = writeln!(out, "  Resume: {}", if p.resume { "yes" } else { "no" });
        }
        let _ = writeln!(out);

        let params = p.settings.parameters();
        if !params.is_empty() {
            let _ = writeln!(out, "Parameters:");
            for (label, value) in params {
                let _ = writeln!(out, "  {label}: {value}");
            }
            let _ = writeln!(out);
        }

        for (heading, lines) in p.settings.sections() {
            let _ = writeln!(out, "{heading}:");
            for line in lines {
                let _ = writeln!(out, "  {line}");
            }
            let _ = writeln!(out);
        }

        if !self.databases.is_empty() {
            let _ = writeln!(out, "Databases Required:");
            for db in &self.databases {
                let mark = if db.installed { '\u{2713}' } else { '\u{2717}' };
                let _ = writeln!(out, "  {mark} {}: {}", db.name, db.path.display());
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "Nextflow Command:");
        let _ = writeln!(out, "  {}", self.command_line);
        let _ = writeln!(
            out,
            "  (working directory: {})",
            self.command.working_dir.display()
        );
        out
    }
}

fn describe_mode(mode: InputMode) -> &'static str {
    match mode {
        InputMode::SingleFile => "Single FASTA file",
        InputMode::Directory => "Genome directory",
        InputMode::BacterialWorkflow => "Bacterial workflow output",
        InputMode::ProphageWorkflow => "Prophage workflow results",
        InputMode::DirectSubdir => "Direct subdirectory",
    }
}

fn enabled(on: bool) -> String {
    let state = if on { "enabled" } else { "skipped" };
    state.to_string()
}

impl PlanSummary for GenomeQcSettings {
    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Completeness threshold", format!("{}%", self.completeness_threshold)),
            ("Contamination threshold", format!("{}%", self.contamination_threshold)),
            ("dRep ANI threshold", self.drep_ani_threshold.to_string()),
        ]
    }
}

impl PlanSummary for ProphageSettings {
    fn parameters(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("geNomad", enabled(self.genomad.is_some())),
            ("VIBRANT", enabled(self.vibrant.is_some())),
        ];
        if let Some(genomad) = &self.genomad {
            let preset = genomad
                .preset
                .map_or_else(|| NOT_CONFIGURED.to_string(), |p| p.as_str().to_string());
            params.push(("geNomad preset", preset));
        }
        if let Some(vibrant) = &self.vibrant {
            let length = vibrant
                .min_length
                .map_or_else(|| NOT_CONFIGURED.to_string(), |l| format!("{l} bp"));
            params.push(("VIBRANT min length", length));
        }
        params
    }
}

impl PlanSummary for AnnotationSettings {
    fn parameters(&self) -> Vec<(&'static str, String)> {
        let levels: Vec<&str> = self
            .checkv_quality_levels
            .iter()
            .map(|t| t.as_str())
            .collect();
        let mut params = vec![
            ("Min prophage length", format!("{} bp", self.min_prophage_length)),
            ("Quality levels", levels.join(", ")),
            ("Detailed annotation", enabled(!self.skips_detailed_annotation())),
        ];
        if let Some(filter) = &self.structural_filter {
            params.push((
                "Filter mode",
                format!("{} ({})", filter.mode.as_str(), filter.mode.describe()),
            ));
            params.push((
                "Pharokka thresholds",
                format!(
                    "\u{2265}{}% structural genes AND \u{2265}{} total",
                    filter.pharokka.perc, filter.pharokka.total
                ),
            ));
            params.push((
                "PHOLD thresholds",
                format!(
                    "\u{2265}{}% structural genes AND \u{2265}{} total",
                    filter.phold.perc, filter.phold.total
                ),
            ));
        }
        params.push(("Clustering min ANI", format!("{}%", self.clustering_min_ani)));
        params.push((
            "Clustering min coverage",
            format!("{}%", self.clustering_min_coverage),
        ));
        params
    }
}

impl PlanSummary for InstallSettings {
    fn parameters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn sections(&self) -> Vec<(String, Vec<String>)> {
        let catalog = ToolCatalog::builtin();
        let mut sections = Vec::new();

        if !self.tools.is_empty() {
            let lines = self
                .tools
                .iter()
                .map(|name| {
                    let description = catalog.get(name).map_or("", |t| t.description);
                    format!("- {name:15} ({description})")
                })
                .collect();
            sections.push((format!("Tools to install ({})", self.tools.len()), lines));
        }

        if !self.databases.is_empty() {
            let mut lines: Vec<String> = self
                .databases
                .iter()
                .map(|name| {
                    let tool = catalog.get(name);
                    let size = tool
                        .and_then(|t| t.database)
                        .map_or_else(|| "?".to_string(), |d| format!("{:.1}GB", d.size_gb));
                    let description = tool.map_or("", |t| t.description);
                    format!("- {name:15} (~{size:>6}) - {description}")
                })
                .collect();
            lines.push(format!(
                "Total estimated download: ~{}",
                catalog.total_size(&self.databases)
            ));
            sections.push((
                format!("Databases to install ({})", self.databases.len()),
                lines,
            ));
        }

        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Backend, Workflow};
    use crate::input::classifier::InputResolution;
    use crate::validation::pipeline::{EngineSettings, ValidatedInput};

    fn validated<S>(settings: S, db: PathBuf, required: &[&str]) -> ValidatedParameters<S> {
        ValidatedParameters {
            workflow: Workflow::Annotation,
            input: Some(ValidatedInput {
                option: "--prophage",
                resolution: InputResolution {
                    mode: InputMode::SingleFile,
                    path: PathBuf::from("/data/prophages.fasta"),
                    marker: None,
                    sequence_files: 1,
                },
            }),
            output_dir: Some(PathBuf::from("/data/out")),
            threads: Some(4),
            resume: false,
            engine: EngineSettings {
                backend: Backend::Singularity,
                db_location: db,
                db_location_configured: true,
                cache_location: None,
            },
            required_databases: required.iter().map(ToString::to_string).collect(),
            settings,
        }
    }

    fn annotation_settings() -> AnnotationSettings {
        use crate::engine::defaults::EngineDefaults;
        use crate::validation::policy::{AnnotationPolicy, WorkflowPolicy};
        AnnotationPolicy::default()
            .settings(&EngineDefaults::builtin(std::path::Path::new("/p")))
            .unwrap()
    }

    #[test]
    fn test_text_plan_sections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("checkv_database")).unwrap();

        let params = validated(
            annotation_settings(),
            dir.path().to_path_buf(),
            &["checkv", "pharokka"],
        );
        let invocation = Invocation::assemble(&params, std::path::Path::new("/opt/phorager"));
        let text = Plan::new(&params, &invocation).render_text();

        assert!(text.contains("Single FASTA file detected"));
        assert!(text.contains("Threads: 4"));
        assert!(text.contains("Cache location: (using pipeline defaults)"));
        assert!(text.contains("Filter mode: combined"));
        assert!(text.contains("\u{2713} checkv"));
        assert!(text.contains("\u{2717} pharokka"));
        assert!(text.contains(
            "nextflow run main.nf --workflow annotation --prophage /data/prophages.fasta"
        ));
        assert!(text.contains("(working directory: /opt/phorager)"));
    }

    #[test]
    fn test_json_plan_fields() {
        let dir = tempfile::tempdir().unwrap();
        let params = validated(annotation_settings(), dir.path().to_path_buf(), &["checkv"]);
        let invocation = Invocation::assemble(&params, std::path::Path::new("/opt/phorager"));
        let value = serde_json::to_value(Plan::new(&params, &invocation)).unwrap();

        assert_eq!(value["workflow"], "annotation");
        assert_eq!(value["input"]["mode"], "single_file");
        assert_eq!(value["input"]["option"], "--prophage");
        assert_eq!(value["databases"][0]["installed"], false);
        assert_eq!(value["command"]["program"], "nextflow");
        assert_eq!(value["settings"]["structural_filter"]["mode"], "combined");
    }

    #[test]
    fn test_install_sections() {
        let settings = InstallSettings {
            tools: vec!["checkm2".to_string()],
            databases: vec!["checkv".to_string(), "phold".to_string()],
        };
        let sections = settings.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "Tools to install (1)");
        assert_eq!(sections[1].0, "Databases to install (2)");
        assert_eq!(
            sections[1].1.last().unwrap(),
            "Total estimated download: ~21.4GB"
        );
    }

    #[test]
    fn test_prophage_parameters_for_skipped_tool() {
        use crate::validation::policy::VibrantSettings;
        let settings = ProphageSettings {
            genomad: None,
            vibrant: Some(VibrantSettings {
                min_length: Some(1000),
            }),
        };
        let params = settings.parameters();
        assert_eq!(params[0], ("geNomad", "skipped".to_string()));
        assert!(params.iter().all(|(label, _)| *label != "geNomad preset"));
        assert!(params.contains(&("VIBRANT min length", "1000 bp".to_string())));
    }
}
