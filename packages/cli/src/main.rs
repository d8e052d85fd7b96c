#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the data tools.
//!
//! `data_tools clean` flattens the HTML description tables of a `GeoJSON`
//! file into feature properties; `data_tools validate-openapi` checks an
//! OpenAPI 3 document and prints its schema violations. Running without a
//! subcommand opens an interactive menu.

mod commands;
mod config;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{CleanArgs, OutputFormat, ValidateArgs};

#[derive(Parser)]
#[command(
    name = "data_tools",
    about = "GeoJSON description cleaner and OpenAPI validator"
)]
struct Cli {
    /// TOML config file (overrides the `DATA_TOOLS_CONFIG` env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten the HTML table in each feature's `Description` into properties
    Clean {
        /// `GeoJSON` file to clean (`-` for stdin)
        input: PathBuf,
        /// Write the cleaned document here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Fail unless the result is a valid `GeoJSON` `FeatureCollection`
        #[arg(long)]
        strict: bool,
        /// Truncate stdout output to the configured display limit
        #[arg(long)]
        preview: bool,
    },
    /// Validate an OpenAPI 3 JSON document
    ValidateOpenapi {
        /// OpenAPI JSON file to validate (`-` for stdin)
        input: PathBuf,
        /// JSON schema to validate against instead of the built-in one
        #[arg(long)]
        schema: Option<PathBuf>,
        /// How to print validation errors
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Also print the (truncated) document
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    data_tools_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        return interactive::run(&config).await;
    };

    match command {
        Commands::Clean {
            input,
            output,
            strict,
            preview,
        } => {
            let args = CleanArgs {
                input,
                output,
                strict,
                preview,
            };
            commands::clean(&args, &config).await?;
        }
        Commands::ValidateOpenapi {
            input,
            schema,
            format,
            show,
        } => {
            let args = ValidateArgs {
                input,
                schema,
                format,
                show,
            };
            commands::validate_openapi(&args, &config).await?;
        }
    }

    Ok(())
}
