use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Execution isolation strategy used by the workflow engine
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Per-tool package environments
    Conda,
    /// Per-tool containers
    #[default]
    Singularity,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conda => "conda",
            Self::Singularity => "singularity",
        }
    }

    /// Engine parameter that receives the cache location for this backend
    #[must_use]
    pub fn cache_parameter(self) -> &'static str {
        match self {
            Self::Conda => "--conda_cache_dir",
            Self::Singularity => "--singularity_cache_dir",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow selected in the engine via `--workflow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    Bacterial,
    Prophage,
    Annotation,
    Install,
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bacterial => write!(f, "bacterial"),
            Self::Prophage => write!(f, "prophage"),
            Self::Annotation => write!(f, "annotation"),
            Self::Install => write!(f, "install"),
        }
    }
}

/// Recognized input layout, as detected by the input classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// One FASTA-family file
    SingleFile,
    /// A directory holding FASTA-family files directly
    Directory,
    /// Output root of the bacterial genome QC workflow
    BacterialWorkflow,
    /// Output root of the prophage detection workflow
    ProphageWorkflow,
    /// The prophage detection subdirectory holding the merged sequence file
    DirectSubdir,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleFile => write!(f, "single_file"),
            Self::Directory => write!(f, "directory"),
            Self::BacterialWorkflow => write!(f, "bacterial_workflow"),
            Self::ProphageWorkflow => write!(f, "prophage_workflow"),
            Self::DirectSubdir => write!(f, "direct_subdir"),
        }
    }
}

/// geNomad sensitivity preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenomadPreset {
    Default,
    Conservative,
    Relaxed,
}

impl GenomadPreset {
    pub const NAMES: [&'static str; 3] = ["default", "conservative", "relaxed"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Conservative => "conservative",
            Self::Relaxed => "relaxed",
        }
    }
}

impl std::str::FromStr for GenomadPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "conservative" => Ok(Self::Conservative),
            "relaxed" => Ok(Self::Relaxed),
            other => Err(ValidationError::invalid_enum(
                "--genomad-preset",
                vec![other.to_string()],
                &Self::NAMES,
            )),
        }
    }
}

/// Which structural-gene evidence decides whether a prophage passes filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Pharokka criteria only
    Pharokka,
    /// PHOLD criteria only
    Phold,
    /// Pass if either Pharokka or PHOLD criteria are met
    #[default]
    Combined,
}

impl FilterMode {
    pub const NAMES: [&'static str; 3] = ["pharokka", "phold", "combined"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pharokka => "pharokka",
            Self::Phold => "phold",
            Self::Combined => "combined",
        }
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Pharokka => "Pharokka criteria only",
            Self::Phold => "PHOLD criteria only",
            Self::Combined => "pass if Pharokka OR PHOLD criteria met",
        }
    }
}

impl std::str::FromStr for FilterMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pharokka" => Ok(Self::Pharokka),
            "phold" => Ok(Self::Phold),
            "combined" => Ok(Self::Combined),
            other => Err(ValidationError::invalid_enum(
                "--annotation-filter-mode",
                vec![other.to_string()],
                &Self::NAMES,
            )),
        }
    }
}

/// CheckV quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "Complete")]
    Complete,
    #[serde(rename = "High-quality")]
    HighQuality,
    #[serde(rename = "Medium-quality")]
    MediumQuality,
    #[serde(rename = "Low-quality")]
    LowQuality,
    #[serde(rename = "Not-determined")]
    NotDetermined,
}

impl QualityTier {
    pub const NAMES: [&'static str; 5] = [
        "Complete",
        "High-quality",
        "Medium-quality",
        "Low-quality",
        "Not-determined",
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::HighQuality => "High-quality",
            Self::MediumQuality => "Medium-quality",
            Self::LowQuality => "Low-quality",
            Self::NotDetermined => "Not-determined",
        }
    }

    /// Exact, case-sensitive lookup of a tier literal
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Complete" => Some(Self::Complete),
            "High-quality" => Some(Self::HighQuality),
            "Medium-quality" => Some(Self::MediumQuality),
            "Low-quality" => Some(Self::LowQuality),
            "Not-determined" => Some(Self::NotDetermined),
            _ => None,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_tier_parse_is_case_sensitive() {
        assert_eq!(QualityTier::parse("Complete"), Some(QualityTier::Complete));
        assert_eq!(
            QualityTier::parse("Not-determined"),
            Some(QualityTier::NotDetermined)
        );
        assert_eq!(QualityTier::parse("complete"), None);
        assert_eq!(QualityTier::parse("High-Quality"), None);
    }

    #[test]
    fn test_quality_tier_names_round_trip() {
        for name in QualityTier::NAMES {
            assert_eq!(QualityTier::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_preset_and_filter_mode_from_str() {
        assert_eq!(
            "conservative".parse::<GenomadPreset>().unwrap(),
            GenomadPreset::Conservative
        );
        assert!("Default".parse::<GenomadPreset>().is_err());
        assert_eq!("phold".parse::<FilterMode>().unwrap(), FilterMode::Phold);
        assert!(matches!(
            "both".parse::<FilterMode>(),
            Err(ValidationError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn test_backend_serde_literals() {
        assert_eq!(serde_json::to_string(&Backend::Conda).unwrap(), "\"conda\"");
        let b: Backend = serde_json::from_str("\"singularity\"").unwrap();
        assert_eq!(b, Backend::Singularity);
        assert_eq!(Backend::default(), Backend::Singularity);
        assert_eq!(Backend::Conda.cache_parameter(), "--conda_cache_dir");
    }
}
