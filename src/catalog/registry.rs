use std::collections::HashSet;

use thiserror::Error;

/// Wildcard that selects every tool (or every database)
pub const WILDCARD: &str = "all";

/// Which kind of selection an expansion or error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Tools,
    Databases,
}

impl std::fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tools => write!(f, "tools"),
            Self::Databases => write!(f, "databases"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("{}\n{summary}", invalid_lines(.invalid))]
    InvalidToolOrGroupName {
        /// Unrecognized tokens per selection kind, in report order
        invalid: Vec<(SelectionKind, Vec<String>)>,
        summary: String,
    },

    #[error(
        "No tools or databases specified for installation.\n\
         Use --tools and/or --databases to specify what to install.\n\
         Use --list-available to see available options."
    )]
    NothingSelected,
}

fn invalid_lines(invalid: &[(SelectionKind, Vec<String>)]) -> String {
    invalid
        .iter()
        .map(|(kind, names)| format!("Invalid {kind}: {}", names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Database shipped alongside a tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatabaseSpec {
    /// Subdirectory name below the database location
    pub directory: &'static str,
    /// Approximate download size in gigabytes
    pub size_gb: f64,
}

/// One installable tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub database: Option<DatabaseSpec>,
}

/// Named set of tools installed together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolGroup {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

const TOOLS: &[Tool] = &[
    Tool {
        name: "checkm2",
        description: "Genome quality",
        database: Some(DatabaseSpec {
            directory: "checkm2_database",
            size_gb: 2.9,
        }),
    },
    Tool {
        name: "drep",
        description: "Genome dereplication",
        database: None,
    },
    Tool {
        name: "parsing_env",
        description: "Python parsing environment for data processing",
        database: None,
    },
    Tool {
        name: "genomad",
        description: "Prophage and virus detection in genomes",
        database: Some(DatabaseSpec {
            directory: "genomad_database",
            size_gb: 1.4,
        }),
    },
    Tool {
        name: "vibrant",
        description: "Prophage detection in bacterial genomes",
        database: Some(DatabaseSpec {
            directory: "vibrant_database",
            size_gb: 11.0,
        }),
    },
    Tool {
        name: "checkv",
        description: "Virus genome quality assessment",
        database: Some(DatabaseSpec {
            directory: "checkv_database",
            size_gb: 6.4,
        }),
    },
    Tool {
        name: "pharokka",
        description: "Phage genome annotation",
        database: Some(DatabaseSpec {
            directory: "pharokka_database",
            size_gb: 1.9,
        }),
    },
    Tool {
        name: "phold",
        description: "Protein function prediction",
        database: Some(DatabaseSpec {
            directory: "phold_database",
            size_gb: 15.0,
        }),
    },
];

const GROUPS: &[ToolGroup] = &[
    ToolGroup {
        name: "genome",
        members: &["checkm2", "drep", "parsing_env"],
    },
    ToolGroup {
        name: "prophage",
        members: &["genomad", "vibrant", "parsing_env"],
    },
    ToolGroup {
        name: "annotation",
        members: &["checkv", "pharokka", "phold", "parsing_env"],
    },
];

static BUILTIN: ToolCatalog = ToolCatalog {
    tools: TOOLS,
    groups: GROUPS,
};

/// Result of checking a selection against the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Canonical names, deduplicated, in first-occurrence order
    pub valid: Vec<String>,
    /// Tokens that are neither a name, a group, nor the wildcard
    pub invalid: Vec<String>,
}

/// Static catalog of installable tools, their groups and databases.
///
/// The catalog is fixed at build time; [`ToolCatalog::builtin`] returns the
/// process-wide instance.
#[derive(Debug)]
pub struct ToolCatalog {
    tools: &'static [Tool],
    groups: &'static [ToolGroup],
}

impl ToolCatalog {
    /// The built-in catalog
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// All tools in catalog order
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        self.tools
    }

    #[must_use]
    pub fn groups(&self) -> &[ToolGroup] {
        self.groups
    }

    /// Get a tool by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ToolGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    #[must_use]
    pub fn is_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// True if `name` is a tool that ships a database
    #[must_use]
    pub fn is_database(&self, name: &str) -> bool {
        self.database(name).is_some()
    }

    #[must_use]
    pub fn database(&self, name: &str) -> Option<&DatabaseSpec> {
        self.get(name).and_then(|t| t.database.as_ref())
    }

    /// Names of all tools, in catalog order
    #[must_use]
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name).collect()
    }

    /// Names of all database-backed tools, in catalog order
    #[must_use]
    pub fn database_names(&self) -> Vec<&'static str> {
        self.tools
            .iter()
            .filter(|t| t.database.is_some())
            .map(|t| t.name)
            .collect()
    }

    /// Expand tool names, group names and `all` into individual tool names.
    ///
    /// Tokens are processed left to right and the result keeps the first
    /// occurrence of every name. Unrecognized tokens are passed through
    /// untouched; use [`ToolCatalog::select`] to separate them out.
    #[must_use]
    pub fn expand(&self, kind: SelectionKind, tokens: &[String]) -> Vec<String> {
        let mut expanded: Vec<&str> = Vec::new();

        for token in tokens {
            let token = token.as_str();
            if token == WILDCARD {
                match kind {
                    SelectionKind::Tools => expanded.extend(self.tool_names()),
                    SelectionKind::Databases => expanded.extend(self.database_names()),
                }
            } else if let Some(group) = self.group(token) {
                match kind {
                    SelectionKind::Tools => expanded.extend(group.members.iter().copied()),
                    SelectionKind::Databases => expanded.extend(
                        group
                            .members
                            .iter()
                            .copied()
                            .filter(|m| self.is_database(m)),
                    ),
                }
            } else {
                expanded.push(token);
            }
        }

        let mut seen = HashSet::new();
        expanded
            .into_iter()
            .filter(|name| seen.insert(*name))
            .map(ToString::to_string)
            .collect()
    }

    /// Expand a selection and split it into recognized and unrecognized names
    #[must_use]
    pub fn select(&self, kind: SelectionKind, tokens: &[String]) -> Selection {
        let mut selection = Selection::default();
        for name in self.expand(kind, tokens) {
            let known = match kind {
                SelectionKind::Tools => self.is_tool(&name),
                SelectionKind::Databases => self.is_database(&name),
            };
            if known {
                selection.valid.push(name);
            } else {
                selection.invalid.push(name);
            }
        }
        selection
    }

    /// Like [`ToolCatalog::select`], failing if any token is unrecognized
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidToolOrGroupName` listing every unknown token.
    pub fn validate(
        &self,
        kind: SelectionKind,
        tokens: &[String],
    ) -> Result<Vec<String>, RegistryError> {
        let selection = self.select(kind, tokens);
        if selection.invalid.is_empty() {
            Ok(selection.valid)
        } else {
            Err(RegistryError::InvalidToolOrGroupName {
                invalid: vec![(kind, selection.invalid)],
                summary: self.summary(),
            })
        }
    }

    /// Check a tool selection and a database selection together.
    ///
    /// Returns the valid `(tools, databases)`; when either list has unknown
    /// tokens, one error reports both lists.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidToolOrGroupName` listing every unknown
    /// token of both selections.
    pub fn validate_pair(
        &self,
        tools: &[String],
        databases: &[String],
    ) -> Result<(Vec<String>, Vec<String>), RegistryError> {
        let tools = self.select(SelectionKind::Tools, tools);
        let databases = self.select(SelectionKind::Databases, databases);

        let invalid: Vec<(SelectionKind, Vec<String>)> = [
            (SelectionKind::Tools, tools.invalid),
            (SelectionKind::Databases, databases.invalid),
        ]
        .into_iter()
        .filter(|(_, names)| !names.is_empty())
        .collect();

        if invalid.is_empty() {
            Ok((tools.valid, databases.valid))
        } else {
            Err(RegistryError::InvalidToolOrGroupName {
                invalid,
                summary: self.summary(),
            })
        }
    }

    /// Sum the declared download sizes of the given databases, e.g. `"18.8GB"`.
    ///
    /// Names without a declared database are ignored.
    #[must_use]
    pub fn total_size<S: AsRef<str>>(&self, databases: &[S]) -> String {
        let total = databases
            .iter()
            .filter_map(|db| self.database(db.as_ref()))
            .fold(0.0_f64, |acc, spec| acc + spec.size_gb);
        format!("{total:.1}GB")
    }

    /// Formatted listing of tools, groups, databases and the wildcard
    #[must_use]
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let mut lines = Vec::new();

        lines.push("\nAvailable tools:".to_string());
        lines.push(rule.clone());
        let mut tools: Vec<&Tool> = self.tools.iter().collect();
        tools.sort_by_key(|t| t.name);
        for tool in &tools {
            let marker = if tool.database.is_some() {
                " (requires database)"
            } else {
                ""
            };
            lines.push(format!("  {:15} - {}{marker}", tool.name, tool.description));
        }

        lines.push("\nTool groups:".to_string());
        lines.push(rule.clone());
        let mut groups: Vec<&ToolGroup> = self.groups.iter().collect();
        groups.sort_by_key(|g| g.name);
        for group in groups {
            lines.push(format!("  {:15} - {}", group.name, group.members.join(", ")));
        }

        lines.push("\nAvailable databases:".to_string());
        lines.push(rule.clone());
        for tool in tools.iter().filter(|t| t.database.is_some()) {
            if let Some(db) = &tool.database {
                lines.push(format!(
                    "  {:15} - {} (~{:.1}GB)",
                    tool.name, tool.description, db.size_gb
                ));
            }
        }

        lines.push("\nSpecial values:".to_string());
        lines.push(rule);
        lines.push(format!("  {WILDCARD:15} - All available tools/databases"));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_expand_all_tools() {
        let catalog = ToolCatalog::builtin();
        let expanded = catalog.expand(SelectionKind::Tools, &tokens(&["all"]));
        assert_eq!(
            expanded,
            vec![
                "checkm2",
                "drep",
                "parsing_env",
                "genomad",
                "vibrant",
                "checkv",
                "pharokka",
                "phold"
            ]
        );
    }

    #[test]
    fn test_expand_groups_dedup_keeps_first_position() {
        let catalog = ToolCatalog::builtin();
        let expanded = catalog.expand(SelectionKind::Tools, &tokens(&["genome", "prophage"]));
        assert_eq!(
            expanded,
            vec!["checkm2", "drep", "parsing_env", "genomad", "vibrant"]
        );
    }

    #[test]
    fn test_expand_is_idempotent() {
        let catalog = ToolCatalog::builtin();
        let once = catalog.expand(
            SelectionKind::Tools,
            &tokens(&["annotation", "checkm2", "genome", "checkv"]),
        );
        let twice = catalog.expand(SelectionKind::Tools, &once);
        assert_eq!(once, twice);
        assert_eq!(
            once,
            vec!["checkv", "pharokka", "phold", "parsing_env", "checkm2", "drep"]
        );
    }

    #[test]
    fn test_expand_passes_unknown_tokens_through() {
        let catalog = ToolCatalog::builtin();
        let expanded = catalog.expand(SelectionKind::Tools, &tokens(&["drep", "blast", "drep"]));
        assert_eq!(expanded, vec!["drep", "blast"]);
    }

    #[test]
    fn test_select_splits_invalid() {
        let catalog = ToolCatalog::builtin();
        let selection =
            catalog.select(SelectionKind::Tools, &tokens(&["genome", "bogus", "phold"]));
        assert_eq!(selection.valid, vec!["checkm2", "drep", "parsing_env", "phold"]);
        assert_eq!(selection.invalid, vec!["bogus"]);
    }

    #[test]
    fn test_expand_databases() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(
            catalog.expand(SelectionKind::Databases, &tokens(&["all"])),
            vec!["checkm2", "genomad", "vibrant", "checkv", "pharokka", "phold"]
        );
        assert_eq!(
            catalog.expand(SelectionKind::Databases, &tokens(&["prophage"])),
            vec!["genomad", "vibrant"]
        );

        // drep is a tool but has no database
        let selection = catalog.select(SelectionKind::Databases, &tokens(&["checkv", "drep"]));
        assert_eq!(selection.valid, vec!["checkv"]);
        assert_eq!(selection.invalid, vec!["drep"]);
    }

    #[test]
    fn test_validate_reports_every_invalid_name() {
        let catalog = ToolCatalog::builtin();
        let err = catalog
            .validate(SelectionKind::Tools, &tokens(&["foo", "drep", "bar"]))
            .unwrap_err();
        match &err {
            RegistryError::InvalidToolOrGroupName { invalid, .. } => {
                assert_eq!(
                    invalid,
                    &vec![(SelectionKind::Tools, tokens(&["foo", "bar"]))]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("Invalid tools: foo, bar"));
        assert!(err.to_string().contains("Available tools:"));
    }

    #[test]
    fn test_validate_pair_reports_both_lists() {
        let catalog = ToolCatalog::builtin();
        let err = catalog
            .validate_pair(&tokens(&["bogus", "drep"]), &tokens(&["nope"]))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid tools: bogus\nInvalid databases: nope\n"));
        assert!(msg.contains("Available tools:"));
        // the catalog summary is appended once
        assert_eq!(msg.matches("Available tools:").count(), 1);
    }

    #[test]
    fn test_validate_pair_only_databases_invalid() {
        let catalog = ToolCatalog::builtin();
        let err = catalog
            .validate_pair(&tokens(&["checkm2"]), &tokens(&["drep"]))
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid databases: drep\n"));

        let (tools, databases) = catalog
            .validate_pair(&tokens(&["genome"]), &tokens(&["checkv"]))
            .unwrap();
        assert_eq!(tools, vec!["checkm2", "drep", "parsing_env"]);
        assert_eq!(databases, vec!["checkv"]);
    }

    #[test]
    fn test_total_size() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(catalog.total_size(&["checkm2"]), "2.9GB");
        assert_eq!(catalog.total_size(&["checkv", "pharokka", "phold"]), "23.3GB");
        assert_eq!(catalog.total_size(&catalog.database_names()), "38.6GB");
        assert_eq!(catalog.total_size::<&str>(&[]), "0.0GB");
        assert_eq!(catalog.total_size(&["drep", "unknown"]), "0.0GB");
    }

    #[test]
    fn test_database_directories_come_from_table() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(catalog.database("genomad").unwrap().directory, "genomad_database");
        assert_eq!(catalog.database("vibrant").unwrap().directory, "vibrant_database");
        assert!(catalog.database("parsing_env").is_none());
    }

    #[test]
    fn test_summary_lists_everything() {
        let summary = ToolCatalog::builtin().summary();
        assert!(summary.contains("Available tools:"));
        assert!(summary.contains("checkm2         - Genome quality (requires database)"));
        assert!(summary.contains("genome          - checkm2, drep, parsing_env"));
        assert!(summary.contains("phold           - Protein function prediction (~15.0GB)"));
        assert!(summary.contains("all             - All available tools/databases"));
    }
}
