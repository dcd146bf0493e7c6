//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use ledgerline_core::models::ConfigFile;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a sample configuration file
    Init(InitArgs),

    /// Load a configuration file and print it as JSON
    Show {
        /// Configuration file (YAML or JSON)
        path: PathBuf,
    },
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long, default_value = "ledgerline.yaml")]
    output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Show { path } => show_config(path),
    }
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(&args.output, ConfigFile::sample().to_yaml()?)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        args.output.display()
    );

    Ok(())
}

fn show_config(path: PathBuf) -> anyhow::Result<()> {
    let config = ConfigFile::load(&path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
