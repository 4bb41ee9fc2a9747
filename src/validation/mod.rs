//! Parameter validation for every workflow subcommand.
//!
//! Validation runs as one generic pipeline ([`pipeline::Validator`]) driven by a
//! per-subcommand policy ([`policy::WorkflowPolicy`]):
//!
//! 1. classify the primary input path
//! 2. range-check and enum-check each parameter
//! 3. apply the cross-parameter conflict rules
//! 4. check that every required database is installed
//! 5. resolve the output directory
//!
//! Any failure stops the pipeline; the command assembler only ever receives a
//! fully validated [`pipeline::ValidatedParameters`] record.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::registry::RegistryError;
use crate::config::store::ConfigError;
use crate::database::checker::DatabaseError;
use crate::input::classifier::InputError;

pub mod params;
pub mod pipeline;
pub mod policy;

/// Parameter-level validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{parameter} must be {expected}, got {value}")]
    OutOfRange {
        parameter: &'static str,
        value: String,
        expected: String,
    },

    #[error(
        "Invalid {parameter} value(s): {}. Valid values are: {}",
        .invalid.join(", "),
        .allowed.join(", ")
    )]
    InvalidEnumValue {
        parameter: &'static str,
        invalid: Vec<String>,
        allowed: Vec<&'static str>,
    },

    #[error("{parameter} cannot be empty")]
    EmptyEnumeration { parameter: &'static str },

    #[error("{0}")]
    ConflictingParameters(String),
}

impl ValidationError {
    pub(crate) fn out_of_range(
        parameter: &'static str,
        value: impl std::fmt::Display,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
    ) -> Self {
        Self::OutOfRange {
            parameter,
            value: value.to_string(),
            expected: format!("between {min} and {max}"),
        }
    }

    pub(crate) fn below_minimum(
        parameter: &'static str,
        value: impl std::fmt::Display,
        min: impl std::fmt::Display,
    ) -> Self {
        Self::OutOfRange {
            parameter,
            value: value.to_string(),
            expected: format!("at least {min}"),
        }
    }

    pub(crate) fn invalid_enum(
        parameter: &'static str,
        invalid: Vec<String>,
        allowed: &[&'static str],
    ) -> Self {
        Self::InvalidEnumValue {
            parameter,
            invalid,
            allowed: allowed.to_vec(),
        }
    }
}

/// Everything that can stop a workflow before the engine is invoked
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Output directory {path} is not usable: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
