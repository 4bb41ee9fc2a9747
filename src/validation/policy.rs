//! Per-workflow validation policies.
//!
//! A policy carries the workflow-specific arguments exactly as given on the
//! command line and knows how to turn them into a validated settings record.
//! The generic [`Validator`](super::pipeline::Validator) supplies everything
//! the workflows have in common.

use serde::Serialize;

use crate::catalog::registry::{RegistryError, ToolCatalog};
use crate::core::types::{FilterMode, GenomadPreset, QualityTier, Workflow};
use crate::engine::command::{EngineArgs, EngineParams};
use crate::engine::defaults::EngineDefaults;
use crate::input::layout::InputLayout;
use crate::validation::params::{
    check_annotation_filter, check_detection_tools, check_f64, check_i64, parse_quality_tiers,
    StructuralFilterArgs, DEFAULT_CLUSTERING_ANI, DEFAULT_CLUSTERING_COVERAGE,
    DEFAULT_MIN_PROPHAGE_LENGTH, DEFAULT_QUALITY_LEVELS, DEFAULT_STRUCTURAL_PERC,
    DEFAULT_STRUCTURAL_TOTAL, FRACTION_RANGE, PERCENT_RANGE, SEQUENCE_LENGTH_RANGE,
    STRUCTURAL_TOTAL_RANGE,
};
use crate::validation::WorkflowError;

/// Workflow-specific part of the validation pipeline
pub trait WorkflowPolicy {
    /// Validated, internally consistent workflow settings
    type Settings: EngineParams + Serialize + std::fmt::Debug;

    fn workflow(&self) -> Workflow;

    /// How the primary input is classified; `None` for workflows without one
    fn input_layout(&self) -> Option<InputLayout>;

    /// Whether the workflow writes into an output directory
    fn uses_output_dir(&self) -> bool {
        true
    }

    /// Range-check, enum-check and conflict-check the workflow arguments
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    fn settings(&self, defaults: &EngineDefaults) -> Result<Self::Settings, WorkflowError>;

    /// Databases the enabled stages need, in check order
    fn required_databases(&self, settings: &Self::Settings) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Bacterial genome QC
// ---------------------------------------------------------------------------

/// Bacterial genome QC arguments; unset thresholds take the engine defaults
#[derive(Debug, Clone, Default)]
pub struct GenomeQcPolicy {
    pub completeness_threshold: Option<f64>,
    pub contamination_threshold: Option<f64>,
    pub drep_ani_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenomeQcSettings {
    pub completeness_threshold: f64,
    pub contamination_threshold: f64,
    pub drep_ani_threshold: f64,
}

impl WorkflowPolicy for GenomeQcPolicy {
    type Settings = GenomeQcSettings;

    fn workflow(&self) -> Workflow {
        Workflow::Bacterial
    }

    fn input_layout(&self) -> Option<InputLayout> {
        Some(InputLayout::GenomeQc)
    }

    fn settings(&self, defaults: &EngineDefaults) -> Result<GenomeQcSettings, WorkflowError> {
        Ok(GenomeQcSettings {
            completeness_threshold: check_f64(
                "--completeness-threshold",
                self.completeness_threshold
                    .unwrap_or(defaults.completeness_threshold),
                &PERCENT_RANGE,
            )?,
            contamination_threshold: check_f64(
                "--contamination-threshold",
                self.contamination_threshold
                    .unwrap_or(defaults.contamination_threshold),
                &PERCENT_RANGE,
            )?,
            drep_ani_threshold: check_f64(
                "--drep-ani-threshold",
                self.drep_ani_threshold.unwrap_or(defaults.drep_ani_threshold),
                &FRACTION_RANGE,
            )?,
        })
    }

    fn required_databases(&self, _settings: &GenomeQcSettings) -> Vec<String> {
        vec!["checkm2".to_string()]
    }
}

impl EngineParams for GenomeQcSettings {
    fn push_engine_args(&self, args: &mut EngineArgs) {
        args.float("--completeness_threshold", self.completeness_threshold)
            .float("--contamination_threshold", self.contamination_threshold)
            .float("--drep_ani_threshold", self.drep_ani_threshold);
    }
}

// ---------------------------------------------------------------------------
// Prophage detection
// ---------------------------------------------------------------------------

/// Prophage detection arguments
#[derive(Debug, Clone, Default)]
pub struct ProphagePolicy {
    pub skip_genomad: bool,
    pub skip_vibrant: bool,
    pub genomad_preset: Option<String>,
    pub vibrant_min_length: Option<i64>,
}

/// geNomad settings; `None` preset leaves the choice to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenomadSettings {
    pub preset: Option<GenomadPreset>,
}

/// VIBRANT settings; `None` length leaves the choice to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VibrantSettings {
    pub min_length: Option<i64>,
}

/// A skipped tool has no settings at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProphageSettings {
    pub genomad: Option<GenomadSettings>,
    pub vibrant: Option<VibrantSettings>,
}

impl WorkflowPolicy for ProphagePolicy {
    type Settings = ProphageSettings;

    fn workflow(&self) -> Workflow {
        Workflow::Prophage
    }

    fn input_layout(&self) -> Option<InputLayout> {
        Some(InputLayout::ProphageDetection)
    }

    fn settings(&self, _defaults: &EngineDefaults) -> Result<ProphageSettings, WorkflowError> {
        let preset = self
            .genomad_preset
            .as_deref()
            .map(str::parse::<GenomadPreset>)
            .transpose()?;
        let min_length = self
            .vibrant_min_length
            .map(|len| check_i64("--vibrant-min-length", len, &SEQUENCE_LENGTH_RANGE))
            .transpose()?;

        check_detection_tools(
            self.skip_genomad,
            self.skip_vibrant,
            preset.is_some(),
            min_length.is_some(),
        )?;

        Ok(ProphageSettings {
            genomad: (!self.skip_genomad).then_some(GenomadSettings { preset }),
            vibrant: (!self.skip_vibrant).then_some(VibrantSettings { min_length }),
        })
    }

    fn required_databases(&self, settings: &ProphageSettings) -> Vec<String> {
        let mut required = Vec::new();
        if settings.genomad.is_some() {
            required.push("genomad".to_string());
        }
        if settings.vibrant.is_some() {
            required.push("vibrant".to_string());
        }
        required
    }
}

impl EngineParams for ProphageSettings {
    fn push_engine_args(&self, args: &mut EngineArgs) {
        if self.genomad.is_none() {
            args.value("--run_genomad", false);
        }
        if self.vibrant.is_none() {
            args.value("--run_vibrant", false);
        }
        if let Some(preset) = self.genomad.and_then(|g| g.preset) {
            args.value("--genomad_preset", preset.as_str());
        }
        if let Some(min_length) = self.vibrant.and_then(|v| v.min_length) {
            args.value("--vibrant_min_length", min_length);
        }
    }
}

// ---------------------------------------------------------------------------
// Prophage annotation
// ---------------------------------------------------------------------------

/// Prophage annotation arguments, defaulted like the command line
#[derive(Debug, Clone)]
pub struct AnnotationPolicy {
    pub min_prophage_length: i64,
    pub checkv_quality_levels: String,
    pub skip_detailed_annotation: bool,
    pub annotation_filter_mode: String,
    pub pharokka_structural_perc: f64,
    pub pharokka_structural_total: i64,
    pub phold_structural_perc: f64,
    pub phold_structural_total: i64,
    pub clustering_min_ani: f64,
    pub clustering_min_coverage: f64,
}

impl Default for AnnotationPolicy {
    fn default() -> Self {
        Self {
            min_prophage_length: DEFAULT_MIN_PROPHAGE_LENGTH,
            checkv_quality_levels: DEFAULT_QUALITY_LEVELS.to_string(),
            skip_detailed_annotation: false,
            annotation_filter_mode: FilterMode::default().as_str().to_string(),
            pharokka_structural_perc: DEFAULT_STRUCTURAL_PERC,
            pharokka_structural_total: DEFAULT_STRUCTURAL_TOTAL,
            phold_structural_perc: DEFAULT_STRUCTURAL_PERC,
            phold_structural_total: DEFAULT_STRUCTURAL_TOTAL,
            clustering_min_ani: DEFAULT_CLUSTERING_ANI,
            clustering_min_coverage: DEFAULT_CLUSTERING_COVERAGE,
        }
    }
}

/// Structural-gene thresholds for one annotation tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructuralThresholds {
    pub perc: f64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructuralFilter {
    pub mode: FilterMode,
    pub pharokka: StructuralThresholds,
    pub phold: StructuralThresholds,
}

/// `structural_filter` is `None` exactly when detailed annotation is skipped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSettings {
    pub min_prophage_length: i64,
    pub checkv_quality_levels: Vec<QualityTier>,
    pub structural_filter: Option<StructuralFilter>,
    pub clustering_min_ani: f64,
    pub clustering_min_coverage: f64,
}

impl AnnotationSettings {
    #[must_use]
    pub fn skips_detailed_annotation(&self) -> bool {
        self.structural_filter.is_none()
    }
}

impl WorkflowPolicy for AnnotationPolicy {
    type Settings = AnnotationSettings;

    fn workflow(&self) -> Workflow {
        Workflow::Annotation
    }

    fn input_layout(&self) -> Option<InputLayout> {
        Some(InputLayout::Annotation)
    }

    fn settings(&self, _defaults: &EngineDefaults) -> Result<AnnotationSettings, WorkflowError> {
        let min_prophage_length = check_i64(
            "--min-prophage-length",
            self.min_prophage_length,
            &SEQUENCE_LENGTH_RANGE,
        )?;
        let checkv_quality_levels = parse_quality_tiers(&self.checkv_quality_levels)?;
        let mode: FilterMode = self.annotation_filter_mode.parse()?;

        let pharokka = StructuralThresholds {
            perc: check_f64(
                "--pharokka-structural-perc",
                self.pharokka_structural_perc,
                &PERCENT_RANGE,
            )?,
            total: check_i64(
                "--pharokka-structural-total",
                self.pharokka_structural_total,
                &STRUCTURAL_TOTAL_RANGE,
            )?,
        };
        let phold = StructuralThresholds {
            perc: check_f64(
                "--phold-structural-perc",
                self.phold_structural_perc,
                &PERCENT_RANGE,
            )?,
            total: check_i64(
                "--phold-structural-total",
                self.phold_structural_total,
                &STRUCTURAL_TOTAL_RANGE,
            )?,
        };
        let clustering_min_ani =
            check_f64("--clustering-min-ani", self.clustering_min_ani, &PERCENT_RANGE)?;
        let clustering_min_coverage = check_f64(
            "--clustering-min-coverage",
            self.clustering_min_coverage,
            &PERCENT_RANGE,
        )?;

        check_annotation_filter(
            self.skip_detailed_annotation,
            &StructuralFilterArgs {
                mode,
                pharokka_perc: pharokka.perc,
                pharokka_total: pharokka.total,
                phold_perc: phold.perc,
                phold_total: phold.total,
            },
        )?;

        Ok(AnnotationSettings {
            min_prophage_length,
            checkv_quality_levels,
            structural_filter: (!self.skip_detailed_annotation).then_some(StructuralFilter {
                mode,
                pharokka,
                phold,
            }),
            clustering_min_ani,
            clustering_min_coverage,
        })
    }

    fn required_databases(&self, settings: &AnnotationSettings) -> Vec<String> {
        let mut required = vec!["checkv".to_string()];
        if !settings.skips_detailed_annotation() {
            required.push("pharokka".to_string());
            required.push("phold".to_string());
        }
        required
    }
}

impl EngineParams for AnnotationSettings {
    fn push_engine_args(&self, args: &mut EngineArgs) {
        let levels: Vec<&str> = self
            .checkv_quality_levels
            .iter()
            .map(|tier| tier.as_str())
            .collect();
        args.value("--min_prophage_length", self.min_prophage_length)
            .value("--checkv_quality_levels", levels.join(","));

        match &self.structural_filter {
            None => {
                args.value("--skip_detailed_annotation", true);
            }
            Some(filter) => {
                args.value("--annotation_filter_mode", filter.mode.as_str())
                    .float("--pharokka_structural_perc", filter.pharokka.perc)
                    .value("--pharokka_structural_total", filter.pharokka.total)
                    .float("--phold_structural_perc", filter.phold.perc)
                    .value("--phold_structural_total", filter.phold.total);
            }
        }

        args.float("--clustering_min_ani", self.clustering_min_ani)
            .float("--clustering_min_coverage", self.clustering_min_coverage);
    }
}

// ---------------------------------------------------------------------------
// Install
// ---------------------------------------------------------------------------

/// Install selections as comma-separated tokens
#[derive(Debug, Clone, Default)]
pub struct InstallPolicy {
    pub tools: Vec<String>,
    pub databases: Vec<String>,
}

/// Canonical tool and database names, each list sorted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallSettings {
    pub tools: Vec<String>,
    pub databases: Vec<String>,
}

impl WorkflowPolicy for InstallPolicy {
    type Settings = InstallSettings;

    fn workflow(&self) -> Workflow {
        Workflow::Install
    }

    fn input_layout(&self) -> Option<InputLayout> {
        None
    }

    fn uses_output_dir(&self) -> bool {
        false
    }

    fn settings(&self, _defaults: &EngineDefaults) -> Result<InstallSettings, WorkflowError> {
        if self.tools.is_empty() && self.databases.is_empty() {
            return Err(RegistryError::NothingSelected.into());
        }

        let catalog = ToolCatalog::builtin();
        let (mut tools, mut databases) = catalog.validate_pair(&self.tools, &self.databases)?;
        tools.sort();
        databases.sort();

        Ok(InstallSettings { tools, databases })
    }

    /// Install creates databases, it never requires them
    fn required_databases(&self, _settings: &InstallSettings) -> Vec<String> {
        Vec::new()
    }
}

impl EngineParams for InstallSettings {
    fn push_engine_args(&self, args: &mut EngineArgs) {
        if !self.tools.is_empty() {
            args.value("--tools", self.tools.join(","));
        }
        if !self.databases.is_empty() {
            args.value("--databases", self.databases.join(","));
        }
    }
}
