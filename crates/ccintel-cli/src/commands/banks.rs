//! Banks command - list supported issuers.

use std::path::PathBuf;

use clap::Args;
use console::style;

use super::{load_config, load_templates, resolve_credential};

/// Arguments for the banks command.
#[derive(Args)]
pub struct BanksArgs {
    /// JSON template table to list instead of the built-in banks
    #[arg(long)]
    templates: Option<PathBuf>,
}

pub fn run(args: BanksArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let table = load_templates(args.templates.as_deref(), &config)?;

    println!("{}", style("Supported banks:").bold());
    for template in table.iter() {
        println!("  {} {}", style("•").cyan(), template.name());
    }

    println!();

    let active = config.fallback.enabled && resolve_credential(None, &config).is_some();
    if active {
        println!(
            "{} AI fallback: active ({})",
            style("✓").green(),
            config.fallback.model
        );
    } else {
        println!(
            "{} AI fallback: inactive (set {} to enable)",
            style("ℹ").blue(),
            config.fallback.api_key_env
        );
    }

    Ok(())
}
