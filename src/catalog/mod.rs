//! Static catalog of installable tools and their databases.
//!
//! The catalog knows every tool the workflows use, which named group each
//! belongs to, which tools ship a database (and the database's directory name
//! and download size). It is compiled into the binary and never changes at
//! runtime.
//!
//! ## Groups
//!
//! | Group | Tools |
//! |-------|-------|
//! | `genome` | checkm2, drep, parsing_env |
//! | `prophage` | genomad, vibrant, parsing_env |
//! | `annotation` | checkv, pharokka, phold, parsing_env |
//!
//! The wildcard `all` selects every tool (or every database).
//!
//! ## Example
//!
//! ```rust
//! use phorager::catalog::registry::{SelectionKind, ToolCatalog};
//!
//! let catalog = ToolCatalog::builtin();
//! let tokens = vec!["genome".to_string(), "prophage".to_string()];
//! let tools = catalog.expand(SelectionKind::Tools, &tokens);
//!
//! // parsing_env belongs to both groups but is listed once
//! assert_eq!(tools, ["checkm2", "drep", "parsing_env", "genomad", "vibrant"]);
//! ```

pub mod registry;
