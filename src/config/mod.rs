//! Persistent user configuration.
//!
//! A small JSON record at `~/.phorager/config.json`:
//!
//! ```json
//! {
//!   "backend": "singularity",
//!   "db_location": "/data/phorager/databases",
//!   "cache_location": null
//! }
//! ```
//!
//! `null` locations mean "use the engine's defaults".

pub mod store;

pub use store::{ConfigError, ConfigStore, Settings, SettingsUpdate};
