//! # phorager
//!
//! Command-line front end for the phorager Nextflow pipeline: bacterial genome
//! quality control, prophage detection, and prophage annotation and clustering.
//!
//! The computation itself happens in the pipeline. This crate decides whether
//! a run should be attempted at all and, if so, exactly how the engine is
//! invoked:
//!
//! - **Input classification**: a path may be a single FASTA file, a directory
//!   of genomes, or the output directory of an earlier workflow
//! - **Parameter validation**: range checks, fixed enumerations and
//!   cross-parameter conflict rules per workflow
//! - **Database checks**: every database the enabled stages need must be
//!   installed, and all missing ones are reported together
//! - **Tool registry**: tool and database selections expand group names and
//!   the `all` wildcard
//! - **Command assembly**: one `nextflow run` command with an explicit working
//!   directory
//!
//! ## Example
//!
//! ```rust,no_run
//! use phorager::{EngineDefaults, Invocation, Settings, Validator};
//! use phorager::validation::pipeline::CommonArgs;
//! use phorager::validation::policy::ProphagePolicy;
//! use std::path::{Path, PathBuf};
//!
//! let pipeline_dir = Path::new("/opt/phorager");
//! let defaults = EngineDefaults::discover(pipeline_dir);
//! let config = Settings::default();
//!
//! let policy = ProphagePolicy {
//!     skip_vibrant: true,
//!     ..Default::default()
//! };
//! let common = CommonArgs {
//!     input: Some(PathBuf::from("genomes/")),
//!     dry_run: true,
//!     ..Default::default()
//! };
//!
//! let validated = Validator::new(&config, &defaults, "/work")
//!     .validate(&policy, &common)
//!     .unwrap();
//! let invocation = Invocation::assemble(&validated, pipeline_dir);
//! println!("{}", invocation.display());
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Installable tools, groups and databases
//! - [`config`]: Persistent user configuration
//! - [`core`]: Shared enumerations
//! - [`database`]: Database presence checks
//! - [`engine`]: Engine defaults and command assembly
//! - [`input`]: Input path classification
//! - [`validation`]: The validation pipeline and per-workflow policies
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod database;
pub mod engine;
pub mod input;
pub mod utils;
pub mod validation;

// Re-export commonly used types for convenience
pub use catalog::registry::ToolCatalog;
pub use config::store::{ConfigStore, Settings};
pub use core::types::*;
pub use engine::command::Invocation;
pub use engine::defaults::EngineDefaults;
pub use input::classifier::{classify, InputResolution};
pub use validation::pipeline::{ValidatedParameters, Validator};
pub use validation::{ValidationError, WorkflowError};
