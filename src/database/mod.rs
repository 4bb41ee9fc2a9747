//! Database presence checking.
//!
//! Databases live below a single base location, one subdirectory per tool.
//! The subdirectory name for each tool comes from the tool catalog's declared
//! mapping, never from a naming formula:
//!
//! ```text
//! <db_location>/
//! ├── checkm2_database/
//! ├── genomad_database/
//! ├── vibrant_database/
//! ├── checkv_database/
//! ├── pharokka_database/
//! └── phold_database/
//! ```

pub mod checker;
