use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::catalog::registry::ToolCatalog;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error(
        "Database location does not exist: {}\n\
         Run 'phorager config set --db-location /path/to/databases' to set the location.",
        .location.display()
    )]
    LocationMissing { location: PathBuf },

    #[error("Unknown database: {name}")]
    UnknownDatabase { name: String },

    #[error(
        "Required database(s) not found in {}:\n{}\n\nInstall missing databases with:\n  {}",
        .location.display(),
        .missing.iter().map(|m| format!("  - {m}")).collect::<Vec<_>>().join("\n"),
        remediation_command(.missing)
    )]
    Missing {
        location: PathBuf,
        missing: Vec<String>,
    },

    #[error("Failed to inspect {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The single command that installs every listed database
#[must_use]
pub fn remediation_command<S: AsRef<str>>(missing: &[S]) -> String {
    let names: Vec<&str> = missing.iter().map(AsRef::as_ref).collect();
    format!("phorager install --databases {}", names.join(","))
}

/// Expected directory of a database below `location`, if the name is known
#[must_use]
pub fn database_dir(catalog: &ToolCatalog, location: &Path, name: &str) -> Option<PathBuf> {
    catalog
        .database(name)
        .map(|spec| location.join(spec.directory))
}

fn exists(path: &Path) -> Result<bool, DatabaseError> {
    path.try_exists().map_err(|source| DatabaseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Report which of the required databases are not installed below `location`.
///
/// Every name is checked; the returned list keeps the order of `required`.
///
/// # Errors
///
/// Returns `DatabaseError::LocationMissing` if `location` does not exist,
/// `DatabaseError::UnknownDatabase` for a name with no declared directory,
/// or `DatabaseError::Io` if the filesystem cannot be queried.
pub fn find_missing<S: AsRef<str>>(
    catalog: &ToolCatalog,
    required: &[S],
    location: &Path,
) -> Result<Vec<String>, DatabaseError> {
    if !exists(location)? {
        return Err(DatabaseError::LocationMissing {
            location: location.to_path_buf(),
        });
    }

    let mut missing = Vec::new();
    for name in required {
        let name = name.as_ref();
        let dir = database_dir(catalog, location, name).ok_or_else(|| {
            DatabaseError::UnknownDatabase {
                name: name.to_string(),
            }
        })?;

        if exists(&dir)? {
            debug!(database = name, path = %dir.display(), "database present");
        } else {
            debug!(database = name, path = %dir.display(), "database missing");
            missing.push(name.to_string());
        }
    }

    Ok(missing)
}

/// Fail unless every required database is installed below `location`.
///
/// # Errors
///
/// Returns `DatabaseError::Missing` with the full list of absent databases,
/// or any error from [`find_missing`].
pub fn ensure_installed<S: AsRef<str>>(
    catalog: &ToolCatalog,
    required: &[S],
    location: &Path,
) -> Result<(), DatabaseError> {
    let missing = find_missing(catalog, required, location)?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatabaseError::Missing {
            location: location.to_path_buf(),
            missing,
        })
    }
}
