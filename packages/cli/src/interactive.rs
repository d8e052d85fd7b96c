//! Interactive menu.
//!
//! Lets users pick a tool and a file with `dialoguer` prompts instead of
//! remembering subcommands and flags.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::commands::{self, CleanArgs, CommandError, OutputFormat, ValidateArgs};
use crate::config::Config;

/// Tools offered by the menu.
enum Tool {
    GeoJson,
    OpenApi,
}

impl Tool {
    const ALL: &[Self] = &[Self::GeoJson, Self::OpenApi];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::GeoJson => "GeoJSON File Reformatter",
            Self::OpenApi => "Open API File Validator",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected tool fails on its
/// input. Schema violations are printed, not returned.
pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("Which tool would you like to use?")
        .items(&labels)
        .default(0)
        .interact()?;

    let input: String = Input::new()
        .with_prompt("Path to the file (- for stdin)")
        .interact_text()?;
    let input = PathBuf::from(input.trim());

    match Tool::ALL[idx] {
        Tool::GeoJson => {
            let output: String = Input::new()
                .with_prompt("Output path (leave empty to preview here)")
                .allow_empty(true)
                .interact_text()?;
            let output = output.trim();

            let strict = Confirm::new()
                .with_prompt("Require valid GeoJSON geometry?")
                .default(false)
                .interact()?;

            let args = CleanArgs {
                input,
                output: (!output.is_empty()).then(|| PathBuf::from(output)),
                strict,
                preview: output.is_empty(),
            };
            commands::clean(&args, config).await?;
        }
        Tool::OpenApi => {
            let args = ValidateArgs {
                input,
                schema: None,
                format: OutputFormat::Table,
                show: true,
            };
            match commands::validate_openapi(&args, config).await {
                Ok(_) | Err(CommandError::SchemaViolations { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
