use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::registry::ToolCatalog;
use crate::config::store::Settings;
use crate::core::types::{Backend, Workflow};
use crate::database::checker::ensure_installed;
use crate::engine::defaults::EngineDefaults;
use crate::input::classifier::{classify, InputResolution};
use crate::utils::validation::{absolutize, check_writable};
use crate::validation::params::check_threads;
use crate::validation::policy::WorkflowPolicy;
use crate::validation::WorkflowError;

/// Arguments shared by every workflow subcommand
#[derive(Debug, Clone, Default)]
pub struct CommonArgs {
    /// Primary input path, for workflows that take one
    pub input: Option<PathBuf>,
    /// Output directory; the engine default applies when unset
    pub outdir: Option<PathBuf>,
    pub threads: Option<i64>,
    pub resume: bool,
    /// Plan only: nothing is created on disk
    pub dry_run: bool,
}

/// Backend and locations handed to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSettings {
    pub backend: Backend,
    /// Effective database location used for the installed-database check
    pub db_location: PathBuf,
    /// Whether `db_location` came from the configuration; the engine keeps
    /// its own default otherwise
    pub db_location_configured: bool,
    pub cache_location: Option<PathBuf>,
}

impl EngineSettings {
    /// Configured values, with the engine's database location as fallback
    #[must_use]
    pub fn resolve(config: &Settings, defaults: &EngineDefaults) -> Self {
        Self {
            backend: config.backend,
            db_location: config
                .db_location
                .clone()
                .unwrap_or_else(|| defaults.database_location.clone()),
            db_location_configured: config.db_location.is_some(),
            cache_location: config.cache_location.clone(),
        }
    }
}

/// The classified primary input and the engine option that carries it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedInput {
    pub option: &'static str,
    #[serde(flatten)]
    pub resolution: InputResolution,
}

/// A parameter set that passed every check.
///
/// Only [`Validator::validate`] builds these, so holding one means the input
/// was classified, every parameter is in range, no two parameters conflict,
/// and every required database is installed.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedParameters<S> {
    pub workflow: Workflow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<ValidatedInput>,
    /// Absolute output directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// `None` lets the engine decide
    pub threads: Option<usize>,
    pub resume: bool,
    pub engine: EngineSettings,
    pub required_databases: Vec<String>,
    pub settings: S,
}

/// The single validation pipeline shared by all workflows
#[derive(Debug)]
pub struct Validator<'a> {
    config: &'a Settings,
    defaults: &'a EngineDefaults,
    cwd: PathBuf,
    catalog: &'static ToolCatalog,
}

impl<'a> Validator<'a> {
    /// Relative paths are resolved against `cwd`
    pub fn new(
        config: &'a Settings,
        defaults: &'a EngineDefaults,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            defaults,
            cwd: cwd.into(),
            catalog: ToolCatalog::builtin(),
        }
    }

    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::resolve(self.config, self.defaults)
    }

    /// Run every check for one workflow, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first `WorkflowError` raised by input classification,
    /// parameter checks, the database check, or output directory setup.
    pub fn validate<P: WorkflowPolicy>(
        &self,
        policy: &P,
        common: &CommonArgs,
    ) -> Result<ValidatedParameters<P::Settings>, WorkflowError> {
        let workflow = policy.workflow();
        debug!(%workflow, "validating parameters");

        let input = match (policy.input_layout(), &common.input) {
            (Some(layout), Some(path)) => {
                let path = absolutize(path, &self.cwd);
                let resolution = classify(&path, layout)?;
                Some(ValidatedInput {
                    option: layout.option_name(),
                    resolution,
                })
            }
            _ => None,
        };

        let settings = policy.settings(self.defaults)?;
        let threads = check_threads(common.threads)?;

        let engine = self.engine_settings();
        let required_databases = policy.required_databases(&settings);
        if !required_databases.is_empty() {
            ensure_installed(self.catalog, &required_databases, &engine.db_location)?;
        }

        let output_dir = if policy.uses_output_dir() {
            let requested = common
                .outdir
                .clone()
                .unwrap_or_else(|| self.defaults.outdir.clone());
            let resolved = absolutize(&requested, &self.cwd);
            if !common.dry_run {
                prepare_output_dir(&resolved)?;
            }
            Some(resolved)
        } else {
            None
        };

        Ok(ValidatedParameters {
            workflow,
            input,
            output_dir,
            threads,
            resume: common.resume,
            engine,
            required_databases,
            settings,
        })
    }
}

/// Create the output directory if needed and make sure it accepts files
fn prepare_output_dir(path: &Path) -> Result<(), WorkflowError> {
    let fail = |source| WorkflowError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    };

    if path.is_dir() {
        warn!(
            "Output directory '{}' already exists. Contents may be overwritten.",
            path.display()
        );
    } else {
        fs::create_dir_all(path).map_err(fail)?;
    }
    check_writable(path).map_err(fail)
}
