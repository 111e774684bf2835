use crate::config::toml_config::LogFormat;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "harbor-provider")]
#[command(about = "Harbor registry provider plugin for infrastructure-as-code tools")]
pub struct CliConfig {
    /// Path to a TOML file with a [harbor] table
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format written to stderr
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Speak the plugin protocol on stdin/stdout
    Serve,
    /// Print the provider schema as JSON
    Schema,
    /// Read a data source once and print its state
    Read {
        /// Data source type, e.g. harbor_project
        type_name: String,
        /// Configuration block as JSON, e.g. '{"name":"library"}'
        #[arg(long, default_value = "{}")]
        input: String,
    },
}
