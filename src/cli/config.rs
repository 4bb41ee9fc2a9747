use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Args, Subcommand};

use crate::cli::{Context, OutputFormat};
use crate::config::store::{prepare_location, ConfigStore, Settings, SettingsUpdate};
use crate::core::types::Backend;

const NOT_CONFIGURED: &str = "(using pipeline defaults)";

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set configuration values
    Set {
        /// Execution backend
        #[arg(long)]
        backend: Option<Backend>,

        /// Database installation directory (created if missing)
        #[arg(long)]
        db_location: Option<PathBuf>,

        /// Cache directory for containers or environments (created if missing)
        #[arg(long)]
        cache_location: Option<PathBuf>,
    },

    /// Show the current configuration
    Show {
        /// Output as JSON (same as --format json)
        #[arg(long)]
        json: bool,
    },

    /// Reset the configuration to defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        confirm: bool,
    },
}

pub fn run(args: ConfigArgs, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.config_store()?;
    match args.command {
        ConfigCommands::Set {
            backend,
            db_location,
            cache_location,
        } => run_set(&store, backend, db_location, cache_location),
        ConfigCommands::Show { json } => {
            let format = if json { OutputFormat::Json } else { ctx.format };
            run_show(&store, format)
        }
        ConfigCommands::Reset { confirm } => run_reset(&store, confirm),
    }
}

fn run_set(
    store: &ConfigStore,
    backend: Option<Backend>,
    db_location: Option<PathBuf>,
    cache_location: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let update = SettingsUpdate {
        backend,
        db_location: db_location
            .map(|p| prepare_location(&p, &cwd))
            .transpose()?,
        cache_location: cache_location
            .map(|p| prepare_location(&p, &cwd))
            .transpose()?,
    };
    if update.is_empty() {
        bail!("Nothing to set. Use --backend, --db-location and/or --cache-location.");
    }

    let before = store.load()?;
    let (after, changed) = store.update(update)?;
    if !changed {
        println!("No configuration changes specified.");
        return Ok(());
    }

    if before.backend != after.backend {
        println!("Backend set to: {}", after.backend);
    }
    if before.db_location != after.db_location {
        if let Some(path) = &after.db_location {
            println!("Database location set to: {}", path.display());
        }
    }
    if before.cache_location != after.cache_location {
        if let Some(path) = &after.cache_location {
            println!("Cache location set to: {}", path.display());
        }
    }
    println!("Configuration saved to: {}", store.path().display());
    Ok(())
}

fn run_show(store: &ConfigStore, format: OutputFormat) -> anyhow::Result<()> {
    let settings = store.load()?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        OutputFormat::Text => print!("{}", render_settings(&settings, store)),
    }
    Ok(())
}

fn render_settings(settings: &Settings, store: &ConfigStore) -> String {
    let location = |p: &Option<PathBuf>| {
        p.as_ref()
            .map_or_else(|| NOT_CONFIGURED.to_string(), |p| p.display().to_string())
    };

    let mut out = String::new();
    out.push_str("Phorager Configuration:\n");
    out.push_str(&"=".repeat(24));
    out.push('\n');
    out.push_str(&format!("{:<20}: {}\n", "Backend", settings.backend));
    out.push_str(&format!(
        "{:<20}: {}\n",
        "Db Location",
        location(&settings.db_location)
    ));
    out.push_str(&format!(
        "{:<20}: {}\n",
        "Cache Location",
        location(&settings.cache_location)
    ));
    out.push_str(&format!("\nConfig file: {}\n", store.path().display()));
    if !store.exists() {
        out.push_str("(Config file does not exist - showing defaults)\n");
    }
    out
}

fn run_reset(store: &ConfigStore, confirm: bool) -> anyhow::Result<()> {
    if !confirm && !ask("Reset configuration to defaults? [y/N]: ")? {
        println!("Configuration reset cancelled.");
        return Ok(());
    }

    if store.reset()? {
        println!("Configuration reset to defaults.");
        println!("Config file removed: {}", store.path().display());
    } else {
        println!("Configuration was already at defaults (no config file found).");
    }
    Ok(())
}

fn ask(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let text = render_settings(&Settings::default(), &store);
        assert!(text.contains("Backend             : singularity"));
        assert!(text.contains("Db Location         : (using pipeline defaults)"));
        assert!(text.contains("(Config file does not exist - showing defaults)"));
    }

    #[test]
    fn test_render_configured() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let settings = Settings {
            backend: Backend::Conda,
            db_location: Some(PathBuf::from("/data/db")),
            cache_location: Some(PathBuf::from("/data/cache")),
        };
        store.save(&settings).unwrap();
        let text = render_settings(&settings, &store);
        assert!(text.contains("Backend             : conda"));
        assert!(text.contains("Cache Location      : /data/cache"));
        assert!(!text.contains("does not exist"));
    }
}
