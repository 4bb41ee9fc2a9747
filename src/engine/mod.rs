//! Workflow engine integration.
//!
//! - [`defaults`]: defaults declared in the pipeline's `nextflow.config`
//! - [`command`]: assembly and execution of the `nextflow run` command
//!
//! The engine is always started in the pipeline directory through
//! [`std::process::Command::current_dir`]; nothing here changes the working
//! directory of the running process.

pub mod command;
pub mod defaults;

pub use command::{EngineArgs, EngineError, EngineParams, Invocation};
pub use defaults::EngineDefaults;
