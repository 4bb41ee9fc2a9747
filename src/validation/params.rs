//! Per-parameter domain checks and cross-parameter conflict rules.

use std::ops::RangeInclusive;

use crate::core::types::{FilterMode, QualityTier};
use crate::utils::validation::{in_range_f64, in_range_i64, split_comma_list};
use crate::validation::ValidationError;

pub const PERCENT_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const FRACTION_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const SEQUENCE_LENGTH_RANGE: RangeInclusive<i64> = 500..=50_000;
pub const STRUCTURAL_TOTAL_RANGE: RangeInclusive<i64> = 1..=20;
pub const MIN_THREADS: i64 = 1;

pub const DEFAULT_MIN_PROPHAGE_LENGTH: i64 = 5000;
pub const DEFAULT_QUALITY_LEVELS: &str = "Complete,High-quality,Medium-quality";
pub const DEFAULT_STRUCTURAL_PERC: f64 = 10.0;
pub const DEFAULT_STRUCTURAL_TOTAL: i64 = 3;
pub const DEFAULT_CLUSTERING_ANI: f64 = 95.0;
pub const DEFAULT_CLUSTERING_COVERAGE: f64 = 85.0;

/// Check a floating point parameter against an inclusive range
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` if `value` lies outside `range` or is NaN.
pub fn check_f64(
    parameter: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<f64, ValidationError> {
    if in_range_f64(value, range) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(
            parameter,
            value,
            range.start(),
            range.end(),
        ))
    }
}

/// Check an integer parameter against an inclusive range
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` if `value` lies outside `range`.
pub fn check_i64(
    parameter: &'static str,
    value: i64,
    range: &RangeInclusive<i64>,
) -> Result<i64, ValidationError> {
    if in_range_i64(value, range) {
        Ok(value)
    } else {
        Err(ValidationError::out_of_range(
            parameter,
            value,
            range.start(),
            range.end(),
        ))
    }
}

/// A user-supplied thread count must be at least one; absence is passed through
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` for zero or negative counts.
pub fn check_threads(threads: Option<i64>) -> Result<Option<usize>, ValidationError> {
    match threads {
        None => Ok(None),
        Some(n) if n >= MIN_THREADS => usize::try_from(n)
            .map(Some)
            .map_err(|_| ValidationError::below_minimum("--threads", n, MIN_THREADS)),
        Some(n) => Err(ValidationError::below_minimum("--threads", n, MIN_THREADS)),
    }
}

/// Parse a comma-separated CheckV quality tier selection.
///
/// Order is preserved. Every unrecognized token is reported at once.
///
/// # Errors
///
/// Returns `ValidationError::EmptyEnumeration` if no tokens remain after
/// trimming, or `ValidationError::InvalidEnumValue` listing the unrecognized
/// tokens.
pub fn parse_quality_tiers(levels: &str) -> Result<Vec<QualityTier>, ValidationError> {
    const PARAMETER: &str = "CheckV quality level";

    let tokens = split_comma_list(levels);
    if tokens.is_empty() {
        return Err(ValidationError::EmptyEnumeration {
            parameter: "CheckV quality levels",
        });
    }

    let mut tiers = Vec::with_capacity(tokens.len());
    let mut invalid = Vec::new();
    for token in tokens {
        match QualityTier::parse(&token) {
            Some(tier) => tiers.push(tier),
            None => invalid.push(token),
        }
    }

    if invalid.is_empty() {
        Ok(tiers)
    } else {
        Err(ValidationError::invalid_enum(
            PARAMETER,
            invalid,
            &QualityTier::NAMES,
        ))
    }
}

/// Detection tool selection rules.
///
/// At least one tool must run, and a skipped tool may not be configured.
///
/// # Errors
///
/// Returns `ValidationError::ConflictingParameters` naming the offending flags.
pub fn check_detection_tools(
    skip_genomad: bool,
    skip_vibrant: bool,
    preset_given: bool,
    min_length_given: bool,
) -> Result<(), ValidationError> {
    if skip_genomad && skip_vibrant {
        return Err(ValidationError::ConflictingParameters(
            "Cannot combine --skip-genomad with --skip-vibrant. \
             At least one prophage detection tool must run."
                .to_string(),
        ));
    }
    if skip_genomad && preset_given {
        return Err(ValidationError::ConflictingParameters(
            "Cannot set --genomad-preset when --skip-genomad is enabled".to_string(),
        ));
    }
    if skip_vibrant && min_length_given {
        return Err(ValidationError::ConflictingParameters(
            "Cannot set --vibrant-min-length when --skip-vibrant is enabled".to_string(),
        ));
    }
    Ok(())
}

/// Structural-gene filter settings as given on the command line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuralFilterArgs {
    pub mode: FilterMode,
    pub pharokka_perc: f64,
    pub pharokka_total: i64,
    pub phold_perc: f64,
    pub phold_total: i64,
}

impl Default for StructuralFilterArgs {
    fn default() -> Self {
        Self {
            mode: FilterMode::default(),
            pharokka_perc: DEFAULT_STRUCTURAL_PERC,
            pharokka_total: DEFAULT_STRUCTURAL_TOTAL,
            phold_perc: DEFAULT_STRUCTURAL_PERC,
            phold_total: DEFAULT_STRUCTURAL_TOTAL,
        }
    }
}

impl StructuralFilterArgs {
    #[allow(clippy::float_cmp)] // Any change from the literal default counts as user-supplied
    fn changed_thresholds(&self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.pharokka_perc != DEFAULT_STRUCTURAL_PERC {
            changed.push("--pharokka-structural-perc");
        }
        if self.pharokka_total != DEFAULT_STRUCTURAL_TOTAL {
            changed.push("--pharokka-structural-total");
        }
        if self.phold_perc != DEFAULT_STRUCTURAL_PERC {
            changed.push("--phold-structural-perc");
        }
        if self.phold_total != DEFAULT_STRUCTURAL_TOTAL {
            changed.push("--phold-structural-total");
        }
        changed
    }
}

/// Annotation structural filter rules.
///
/// Skipping detailed annotation leaves nothing to filter on, so the filter
/// must stay at its defaults. Otherwise a single-tool mode may not be given
/// thresholds for the other tool.
///
/// # Errors
///
/// Returns `ValidationError::ConflictingParameters` naming the offending flags.
pub fn check_annotation_filter(
    skip_detailed_annotation: bool,
    filter: &StructuralFilterArgs,
) -> Result<(), ValidationError> {
    let changed = filter.changed_thresholds();

    if skip_detailed_annotation {
        if filter.mode != FilterMode::Combined {
            return Err(ValidationError::ConflictingParameters(
                "Cannot specify --annotation-filter-mode when using --skip-detailed-annotation. \
                 Structural filtering requires annotation. \
                 Remove --skip-detailed-annotation or remove filtering parameters."
                    .to_string(),
            ));
        }
        if !changed.is_empty() {
            return Err(ValidationError::ConflictingParameters(format!(
                "Cannot specify structural filtering parameters when using \
                 --skip-detailed-annotation: {}. \
                 Remove --skip-detailed-annotation or remove structural parameters.",
                changed.join(", ")
            )));
        }
        return Ok(());
    }

    let (other_tool, other_prefix, alternative) = match filter.mode {
        FilterMode::Combined => return Ok(()),
        FilterMode::Pharokka => ("PHOLD", "--phold-", "phold"),
        FilterMode::Phold => ("Pharokka", "--pharokka-", "pharokka"),
    };
    if changed.iter().any(|flag| flag.starts_with(other_prefix)) {
        return Err(ValidationError::ConflictingParameters(format!(
            "Cannot specify {other_tool} structural parameters when filter mode is '{}'. \
             Change filter mode to '{alternative}' or 'combined', or remove {other_tool} parameters.",
            filter.mode.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(check_f64("--x", 0.0, &PERCENT_RANGE).is_ok());
        assert!(check_f64("--x", 100.0, &PERCENT_RANGE).is_ok());
        assert!(check_f64("--x", 100.1, &PERCENT_RANGE).is_err());
        assert!(check_f64("--x", -0.1, &PERCENT_RANGE).is_err());
        assert!(check_f64("--x", f64::NAN, &PERCENT_RANGE).is_err());
        assert!(check_f64("--ani", 1.0, &FRACTION_RANGE).is_ok());
        assert!(check_f64("--ani", 1.5, &FRACTION_RANGE).is_err());

        assert!(check_i64("--len", 500, &SEQUENCE_LENGTH_RANGE).is_ok());
        assert!(check_i64("--len", 50_000, &SEQUENCE_LENGTH_RANGE).is_ok());
        assert!(check_i64("--len", 499, &SEQUENCE_LENGTH_RANGE).is_err());
        assert!(check_i64("--total", 21, &STRUCTURAL_TOTAL_RANGE).is_err());
    }

    #[test]
    fn test_out_of_range_message_names_parameter() {
        let err = check_i64("--min-prophage-length", 100, &SEQUENCE_LENGTH_RANGE).unwrap_err();
        assert_eq!(
            err.to_string(),
            "--min-prophage-length must be between 500 and 50000, got 100"
        );
    }

    #[test]
    fn test_threads() {
        assert_eq!(check_threads(None).unwrap(), None);
        assert_eq!(check_threads(Some(8)).unwrap(), Some(8));
        assert!(matches!(
            check_threads(Some(0)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(check_threads(Some(-4)).is_err());
    }

    #[test]
    fn test_quality_tiers_preserve_order() {
        let tiers = parse_quality_tiers("Medium-quality, Complete").unwrap();
        assert_eq!(tiers, vec![QualityTier::MediumQuality, QualityTier::Complete]);
    }

    #[test]
    fn test_quality_tiers_empty() {
        for input in ["", "   ", " , ,"] {
            assert!(matches!(
                parse_quality_tiers(input),
                Err(ValidationError::EmptyEnumeration { .. })
            ));
        }
    }

    #[test]
    fn test_quality_tiers_report_only_invalid_tokens() {
        let err = parse_quality_tiers("Complete,Invalid,High-quality").unwrap_err();
        match &err {
            ValidationError::InvalidEnumValue { invalid, .. } => {
                assert_eq!(invalid, &vec!["Invalid".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = parse_quality_tiers("complete,Bogus").unwrap_err();
        match err {
            ValidationError::InvalidEnumValue { invalid, .. } => {
                assert_eq!(invalid, vec!["complete".to_string(), "Bogus".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_detection_tools() {
        assert!(check_detection_tools(false, false, true, true).is_ok());
        assert!(check_detection_tools(true, false, false, true).is_ok());

        let err = check_detection_tools(true, true, false, false).unwrap_err();
        assert!(err.to_string().contains("--skip-genomad"));
        assert!(err.to_string().contains("--skip-vibrant"));

        let err = check_detection_tools(true, false, true, false).unwrap_err();
        assert!(err.to_string().contains("--genomad-preset"));

        let err = check_detection_tools(false, true, false, true).unwrap_err();
        assert!(err.to_string().contains("--vibrant-min-length"));
    }

    #[test]
    fn test_skip_annotation_with_defaults_is_fine() {
        assert!(check_annotation_filter(true, &StructuralFilterArgs::default()).is_ok());
    }

    #[test]
    fn test_skip_annotation_with_mode() {
        let filter = StructuralFilterArgs {
            mode: FilterMode::Pharokka,
            ..Default::default()
        };
        let err = check_annotation_filter(true, &filter).unwrap_err();
        assert!(err.to_string().contains("--annotation-filter-mode"));
        assert!(err.to_string().contains("--skip-detailed-annotation"));
    }

    #[test]
    fn test_skip_annotation_lists_changed_thresholds() {
        let filter = StructuralFilterArgs {
            pharokka_total: 5,
            phold_perc: 20.0,
            ..Default::default()
        };
        let err = check_annotation_filter(true, &filter).unwrap_err();
        assert!(err
            .to_string()
            .contains("--pharokka-structural-total, --phold-structural-perc"));
    }

    #[test]
    fn test_single_tool_mode_rejects_other_tool() {
        let filter = StructuralFilterArgs {
            mode: FilterMode::Pharokka,
            phold_total: 4,
            ..Default::default()
        };
        let err = check_annotation_filter(false, &filter).unwrap_err();
        assert!(err.to_string().contains("PHOLD"));
        assert!(err.to_string().contains("'pharokka'"));

        let filter = StructuralFilterArgs {
            mode: FilterMode::Phold,
            pharokka_perc: 12.5,
            ..Default::default()
        };
        let err = check_annotation_filter(false, &filter).unwrap_err();
        assert!(err.to_string().contains("Pharokka structural parameters"));
    }

    #[test]
    fn test_single_tool_mode_accepts_own_thresholds() {
        let filter = StructuralFilterArgs {
            mode: FilterMode::Pharokka,
            pharokka_perc: 30.0,
            pharokka_total: 6,
            ..Default::default()
        };
        assert!(check_annotation_filter(false, &filter).is_ok());
    }

    #[test]
    fn test_combined_mode_accepts_everything() {
        let filter = StructuralFilterArgs {
            mode: FilterMode::Combined,
            pharokka_perc: 30.0,
            phold_total: 6,
            ..Default::default()
        };
        assert!(check_annotation_filter(false, &filter).is_ok());
    }
}
