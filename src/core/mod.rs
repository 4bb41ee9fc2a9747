//! Core data types shared across the validation layer.
//!
//! - [`Backend`]: execution isolation strategy passed to the engine
//! - [`Workflow`]: which engine workflow an invocation targets
//! - [`InputMode`]: the layout the input classifier recognized
//! - [`GenomadPreset`], [`FilterMode`], [`QualityTier`]: categorical parameters
//!
//! Every categorical literal is matched case-sensitively, exactly as the
//! workflow engine expects it.

pub mod types;

pub use types::{Backend, FilterMode, GenomadPreset, InputMode, QualityTier, Workflow};
