use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

/// The engine's configuration file inside the pipeline directory
pub const ENGINE_CONFIG_FILE: &str = "nextflow.config";

pub const DEFAULT_OUTDIR: &str = "results";
pub const DEFAULT_DATABASE_LOCATION: &str = "databases";
pub const DEFAULT_COMPLETENESS: f64 = 95.0;
pub const DEFAULT_CONTAMINATION: f64 = 5.0;
pub const DEFAULT_DREP_ANI: f64 = 0.999;

/// Defaults declared by the engine's own configuration.
///
/// Discovery is best effort: the file is scanned for simple
/// `key = value` assignments and anything not found keeps the built-in value.
/// Thread count is never discovered; leaving it unset lets the engine decide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineDefaults {
    pub outdir: PathBuf,
    /// Database base location, already resolved against the pipeline directory
    pub database_location: PathBuf,
    pub completeness_threshold: f64,
    pub contamination_threshold: f64,
    pub drep_ani_threshold: f64,
}

impl EngineDefaults {
    /// Built-in values, used when the engine configuration says nothing
    #[must_use]
    pub fn builtin(pipeline_dir: &Path) -> Self {
        Self {
            outdir: PathBuf::from(DEFAULT_OUTDIR),
            database_location: pipeline_dir.join(DEFAULT_DATABASE_LOCATION),
            completeness_threshold: DEFAULT_COMPLETENESS,
            contamination_threshold: DEFAULT_CONTAMINATION,
            drep_ani_threshold: DEFAULT_DREP_ANI,
        }
    }

    /// Read `nextflow.config` from `pipeline_dir`, falling back to built-ins
    #[must_use]
    pub fn discover(pipeline_dir: &Path) -> Self {
        let path = pipeline_dir.join(ENGINE_CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_config_text(&content, pipeline_dir),
            Err(e) => {
                warn!(
                    "Could not read {} ({e}); using built-in defaults",
                    path.display()
                );
                Self::builtin(pipeline_dir)
            }
        }
    }

    /// Extract defaults from the text of an engine configuration file
    #[must_use]
    pub fn from_config_text(content: &str, pipeline_dir: &Path) -> Self {
        let mut defaults = Self::builtin(pipeline_dir);

        if let Some(outdir) = quoted_assignment(content, "outdir") {
            defaults.outdir = PathBuf::from(expand_project_dir(&outdir, pipeline_dir));
        }
        if let Some(location) = quoted_assignment(content, "database_location") {
            let location = PathBuf::from(expand_project_dir(&location, pipeline_dir));
            defaults.database_location = if location.is_absolute() {
                location
            } else {
                pipeline_dir.join(location)
            };
        }

        let numeric = [
            ("completeness_threshold", &mut defaults.completeness_threshold),
            ("contamination_threshold", &mut defaults.contamination_threshold),
            ("drep_ani_threshold", &mut defaults.drep_ani_threshold),
        ];
        for (key, slot) in numeric {
            match numeric_assignment(content, key) {
                Some(value) => *slot = value,
                None => warn!("{key} not found in {ENGINE_CONFIG_FILE}; using {slot}"),
            }
        }

        debug!(?defaults, "engine defaults discovered");
        defaults
    }
}

/// First `key = "value"` (or single-quoted) assignment in `content`
fn quoted_assignment(content: &str, key: &str) -> Option<String> {
    let pattern = format!(r#"\b{}\s*=\s*['"]([^'"]+)['"]"#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// First `key = <number>` assignment in `content`
fn numeric_assignment(content: &str, key: &str) -> Option<f64> {
    let pattern = format!(r"\b{}\s*=\s*(\d+\.?\d*)", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    re.captures(content)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Replace the engine's `${projectDir}` / `$projectDir` placeholders
fn expand_project_dir(value: &str, pipeline_dir: &Path) -> String {
    let dir = pipeline_dir.to_string_lossy();
    value
        .replace("${projectDir}", &dir)
        .replace("$projectDir", &dir)
}
