use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::Backend;
use crate::validation::pipeline::ValidatedParameters;

/// Engine executable looked up on `PATH`
pub const ENGINE_PROGRAM: &str = "nextflow";

/// Entry script inside the pipeline directory
pub const ENGINE_SCRIPT: &str = "main.nf";

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("'{program}' was not found on PATH. Install Nextflow and make sure it is on PATH.")]
    NotInstalled {
        program: String,
        #[source]
        source: which::Error,
    },

    #[error(
        "Pipeline script not found: {}\nPass --pipeline-dir or set PHORAGER_PIPELINE_DIR.",
        .path.display()
    )]
    MissingScript { path: PathBuf },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered engine arguments.
///
/// Every value is rendered exactly once here, so all workflows share the same
/// number formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineArgs(Vec<String>);

impl EngineArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bare token such as `-resume`
    pub fn flag(&mut self, flag: &str) -> &mut Self {
        self.0.push(flag.to_string());
        self
    }

    pub fn value(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.0.push(name.to_string());
        self.0.push(value.to_string());
        self
    }

    /// Plain decimal notation that always carries a decimal point
    /// (`95` renders as `95.0`, `1e-5` as `0.00001`)
    pub fn float(&mut self, name: &str, value: f64) -> &mut Self {
        let mut rendered = value.to_string();
        if value.is_finite() && !rendered.contains('.') {
            rendered.push_str(".0");
        }
        self.0.push(name.to_string());
        self.0.push(rendered);
        self
    }

    pub fn path(&mut self, name: &str, path: &Path) -> &mut Self {
        self.value(name, path.display())
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Workflow-specific engine parameters.
///
/// Implemented by each workflow's validated settings; the assembler places
/// these after the input and output arguments.
pub trait EngineParams {
    fn push_engine_args(&self, args: &mut EngineArgs);
}

/// A fully assembled engine command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Directory the engine is started in; the caller's own working
    /// directory is never changed
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Build the engine command for a validated parameter set.
    ///
    /// Order: script, backend profile, workflow, input, outdir, workflow
    /// parameters, threads, database location, cache location, resume.
    /// The database location is passed only when it was configured.
    #[must_use]
    pub fn assemble<S: EngineParams>(params: &ValidatedParameters<S>, working_dir: &Path) -> Self {
        let mut args = EngineArgs::new();
        args.flag("run").flag(ENGINE_SCRIPT);

        if params.engine.backend == Backend::Conda {
            args.value("-profile", "conda");
        }
        args.value("--workflow", params.workflow);

        if let Some(input) = &params.input {
            args.path(input.option, &input.resolution.path);
        }
        if let Some(outdir) = &params.output_dir {
            args.path("--outdir", outdir);
        }

        params.settings.push_engine_args(&mut args);

        if let Some(threads) = params.threads {
            args.value("--threads", threads);
        }
        if params.engine.db_location_configured {
            args.path("--database_location", &params.engine.db_location);
        }
        if let Some(cache) = &params.engine.cache_location {
            args.path(params.engine.backend.cache_parameter(), cache);
        }
        if params.resume {
            args.flag("-resume");
        }

        Self {
            program: ENGINE_PROGRAM.to_string(),
            args: args.into_vec(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Shell-style rendering for display; arguments with spaces are quoted
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Process builder for `program_path`, started in the working directory
    #[must_use]
    pub fn to_command(&self, program_path: &Path) -> Command {
        let mut command = Command::new(program_path);
        command.args(&self.args).current_dir(&self.working_dir);
        command
    }

    /// Locate the engine, run it to completion, and return its exit status.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotInstalled` if the engine is not on `PATH`,
    /// `EngineError::MissingScript` if the working directory has no entry
    /// script, and `EngineError::Spawn` if the process cannot be started.
    pub fn run(&self) -> Result<ExitStatus, EngineError> {
        let program_path =
            which::which(&self.program).map_err(|source| EngineError::NotInstalled {
                program: self.program.clone(),
                source,
            })?;

        let script = self.working_dir.join(ENGINE_SCRIPT);
        if !script.is_file() {
            return Err(EngineError::MissingScript { path: script });
        }

        debug!(
            program = %program_path.display(),
            cwd = %self.working_dir.display(),
            "starting engine"
        );
        info!("Running: {}", self.display());

        self.to_command(&program_path)
            .status()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Workflow;
    use crate::validation::pipeline::EngineSettings;

    struct NoParams;

    impl EngineParams for NoParams {
        fn push_engine_args(&self, _args: &mut EngineArgs) {}
    }

    fn params(db_location_configured: bool) -> ValidatedParameters<NoParams> {
        ValidatedParameters {
            workflow: Workflow::Install,
            input: None,
            output_dir: None,
            threads: None,
            resume: false,
            engine: EngineSettings {
                backend: Backend::Singularity,
                db_location: PathBuf::from("/data/db"),
                db_location_configured,
                cache_location: None,
            },
            required_databases: Vec::new(),
            settings: NoParams,
        }
    }

    #[test]
    fn test_engine_args_formatting() {
        let mut args = EngineArgs::new();
        args.float("--a", 95.0)
            .float("--b", 0.999)
            .value("--c", 3)
            .flag("-resume");
        assert_eq!(
            args.into_vec(),
            vec!["--a", "95.0", "--b", "0.999", "--c", "3", "-resume"]
        );
    }

    #[test]
    fn test_small_floats_stay_decimal() {
        let mut args = EngineArgs::new();
        args.float("--a", 0.00001).float("--b", 1e21).float("--c", 0.0);
        assert_eq!(
            args.into_vec(),
            vec!["--a", "0.00001", "--b", "1000000000000000000000.0", "--c", "0.0"]
        );
    }

    #[test]
    fn test_database_location_only_when_configured() {
        let working_dir = Path::new("/opt/phorager");

        let configured = Invocation::assemble(&params(true), working_dir);
        let pos = configured
            .args
            .iter()
            .position(|a| a == "--database_location")
            .unwrap();
        assert_eq!(configured.args[pos + 1], "/data/db");

        let fallback = Invocation::assemble(&params(false), working_dir);
        assert!(!fallback.args.iter().any(|a| a == "--database_location"));
        assert_eq!(fallback.args, vec!["run", "main.nf", "--workflow", "install"]);
    }

    #[test]
    fn test_display_quotes_spaces() {
        let inv = Invocation {
            program: "nextflow".to_string(),
            args: vec![
                "run".to_string(),
                "--genome".to_string(),
                "/data/my genomes".to_string(),
            ],
            working_dir: PathBuf::from("/opt/phorager"),
        };
        assert_eq!(inv.display(), "nextflow run --genome '/data/my genomes'");
    }

    #[test]
    fn test_to_command_sets_working_dir() {
        let inv = Invocation {
            program: "nextflow".to_string(),
            args: vec!["run".to_string(), "main.nf".to_string()],
            working_dir: PathBuf::from("/opt/phorager"),
        };
        let command = inv.to_command(Path::new("/usr/bin/nextflow"));
        assert_eq!(command.get_current_dir(), Some(Path::new("/opt/phorager")));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["run", "main.nf"]);
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "plain");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
