mod config_store;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use mcf_telemetry::init_cli_logging;

use crate::config_store::{ConfigStore, render};

#[derive(Parser, Debug)]
#[command(
    name = "multicloud",
    version,
    about = "Build and configure functions that run on any cloud"
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Manage the project configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print one value, or the whole configuration when KEY is omitted
    Get { key: Option<String> },
    /// Set a value using dot notation, e.g. `author.name`
    Set { key: String, value: String },
    /// Write author details and defaults in one go
    Init {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, value_enum, default_value_t = Runtime::Python)]
        runtime: Runtime,
        #[arg(long, default_value = "128Mi")]
        memory: String,
        #[arg(long, default_value = "30s")]
        timeout: String,
    },
    /// Show where the configuration lives
    Path,
    /// Delete the configuration file so defaults apply again
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Runtime {
    Python,
    Node,
    Go,
}

impl Runtime {
    fn as_str(self) -> &'static str {
        match self {
            Runtime::Python => "python",
            Runtime::Node => "node",
            Runtime::Go => "go",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logging(cli.verbose);
    match cli.command {
        CliCommand::Config { command } => handle_config(command, &ConfigStore::discover()?),
    }
}

fn handle_config(command: ConfigCommand, store: &ConfigStore) -> Result<()> {
    match command {
        ConfigCommand::Get { key: Some(key) } => match store.get(&key)? {
            Some(value) => {
                let rendered = render(&value)?;
                if rendered.contains('\n') {
                    println!("{key}:\n{rendered}");
                } else {
                    println!("{key}: {rendered}");
                }
            }
            None => println!("Configuration key '{key}' not found."),
        },
        ConfigCommand::Get { key: None } => {
            let config = store.load()?;
            print!("{}", serde_yaml_bw::to_string(&config)?);
        }
        ConfigCommand::Set { key, value } => match store.set(&key, &value) {
            Ok(()) => println!("Set '{key}' to '{value}' in configuration."),
            Err(err) => println!("Error setting configuration '{key}': {err:#}"),
        },
        ConfigCommand::Init {
            name,
            email,
            runtime,
            memory,
            timeout,
        } => {
            store.set_many(&[
                ("author.name", name.as_str()),
                ("author.email", email.as_str()),
                ("defaults.runtime", runtime.as_str()),
                ("defaults.memory", memory.as_str()),
                ("defaults.timeout", timeout.as_str()),
            ])?;
            println!("Configuration saved!");
            println!("Config file: {}", store.file().display());
        }
        ConfigCommand::Path => {
            println!("Config file: {}", store.file().display());
            println!("Config directory: {}", store.dir().display());
        }
        ConfigCommand::Reset { yes: false } => {
            println!("Reset cancelled. Pass --yes to reset all configuration.");
        }
        ConfigCommand::Reset { yes: true } => {
            store.reset()?;
            println!("Configuration reset to defaults");
        }
    }
    Ok(())
}
