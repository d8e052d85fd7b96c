//! Tool implementations shared by the subcommands and the interactive menu.

use std::path::PathBuf;

use data_tools_cli_utils::ingest::{IngestError, read_bytes, read_text, write_text};
use data_tools_cli_utils::render::{preview, table, to_pretty_json};
use data_tools_geojson::validate::check_geojson;
use data_tools_geojson::{CleanError, FlattenStats, flatten_in_place};
use data_tools_geojson_models::Document;
use data_tools_openapi::{OpenApiError, OpenApiValidator};
use data_tools_openapi_models::ValidationIssue;
use serde_json::Value;

use crate::config::Config;

/// Errors surfaced to the user by a tool run.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Reading the input file failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The input is not a usable `GeoJSON` document.
    #[error("Invalid GeoJSON file: {0}")]
    InvalidGeoJson(#[from] CleanError),

    /// The OpenAPI input or schema could not be loaded.
    #[error("Invalid OpenAPI file: {0}")]
    InvalidOpenApi(#[from] OpenApiError),

    /// Serializing the result failed.
    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    /// Writing the output file failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The OpenAPI document has schema violations.
    #[error("{count} schema validation error(s)")]
    SchemaViolations {
        /// Number of issues reported.
        count: usize,
    },
}

/// Output format for validation issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// JSON array of issues.
    Json,
}

/// Options for [`clean`].
#[derive(Debug, Clone)]
pub struct CleanArgs {
    /// `GeoJSON` file to read (`-` for stdin).
    pub input: PathBuf,
    /// Where to write the cleaned document. Stdout when `None`.
    pub output: Option<PathBuf>,
    /// Require the result to be a structurally valid `FeatureCollection`.
    pub strict: bool,
    /// Truncate stdout output to the configured display limit.
    pub preview: bool,
}

/// Options for [`validate_openapi`].
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    /// OpenAPI JSON file to read (`-` for stdin).
    pub input: PathBuf,
    /// Schema file overriding the config and the embedded schema.
    pub schema: Option<PathBuf>,
    /// How to print issues.
    pub format: OutputFormat,
    /// Also print the document itself.
    pub show: bool,
}

/// Reads a `GeoJSON` file, flattens its description tables and writes or
/// prints the result.
///
/// # Errors
///
/// Returns [`CommandError`] if the file cannot be read, is not a feature
/// collection, fails the strict check, or the output cannot be written.
pub async fn clean(args: &CleanArgs, config: &Config) -> Result<FlattenStats, CommandError> {
    let bytes = read_bytes(&args.input).await?;
    let mut document = Document::from_slice(&bytes).map_err(CleanError::from)?;

    if document.is_empty() {
        log::warn!("{} has no features", args.input.display());
    }

    let stats = flatten_in_place(&mut document);

    if args.strict {
        check_geojson(&document)?;
    }

    if let Some(output) = &args.output {
        write_text(output, &to_pretty_json(&document)?).await?;
        println!(
            "File processed successfully! Cleaned {} of {} features -> {}",
            stats.cleaned,
            stats.features,
            output.display()
        );
    } else if args.preview {
        println!("{}", preview(&document, config.display.max_chars)?);
    } else {
        println!("{}", to_pretty_json(&document)?);
    }

    Ok(stats)
}

/// Validates an OpenAPI document and prints the issues found.
///
/// # Errors
///
/// Returns [`CommandError::SchemaViolations`] when the document has issues,
/// or another [`CommandError`] if the file or schema cannot be loaded.
pub async fn validate_openapi(
    args: &ValidateArgs,
    config: &Config,
) -> Result<Vec<ValidationIssue>, CommandError> {
    let text = read_text(&args.input).await?;
    let document: Value = serde_json::from_str(&text).map_err(OpenApiError::from)?;

    let schema = args.schema.as_deref().or(config.openapi.schema.as_deref());
    let validator = match schema {
        Some(path) => {
            log::debug!("Loading OpenAPI schema from {}", path.display());
            OpenApiValidator::from_schema_str(&read_text(path).await?)?
        }
        None => OpenApiValidator::new()?,
    };

    let issues = validator.validate(&document);

    match args.format {
        OutputFormat::Table if issues.is_empty() => println!("File processed successfully!"),
        OutputFormat::Table => {
            println!("Schema Validation Errors:");
            println!("{}", issue_table(&issues));
        }
        OutputFormat::Json => println!("{}", to_pretty_json(&issues)?),
    }

    if args.show {
        println!();
        println!("Open API File:");
        println!("{}", preview(&document, config.display.max_chars)?);
    }

    if issues.is_empty() {
        Ok(issues)
    } else {
        Err(CommandError::SchemaViolations {
            count: issues.len(),
        })
    }
}

/// Renders issues as an "Error Type / Property / Message" table.
#[must_use]
pub fn issue_table(issues: &[ValidationIssue]) -> String {
    let rows: Vec<Vec<String>> = issues
        .iter()
        .map(|issue| {
            vec![
                issue.kind().label().to_owned(),
                issue.property().to_owned(),
                issue.message.clone(),
            ]
        })
        .collect();

    table(&["Error Type", "Property", "Message"], &rows)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("data_tools_{}_{name}", std::process::id()))
    }

    fn issue(keyword: &str, missing: Option<&str>, message: &str) -> ValidationIssue {
        ValidationIssue {
            instance_path: "/info".to_owned(),
            schema_path: format!("/properties/info/{keyword}"),
            keyword: keyword.to_owned(),
            missing_property: missing.map(str::to_owned),
            additional_property: None,
            message: message.to_owned(),
        }
    }

    #[test]
    fn renders_issue_table() {
        let out = issue_table(&[
            issue("required", Some("title"), "\"title\" is a required property"),
            issue("minLength", None, "too short"),
        ]);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Error Type"));
        assert!(lines[2].starts_with("Missing Property  title"));
        assert!(lines[3].starts_with("minLength"));
        assert!(lines[3].contains("/info"));
    }

    #[tokio::test]
    async fn cleans_file_to_output() {
        let input = temp_path("clean_in.geojson");
        let output = temp_path("clean_out.geojson");
        tokio::fs::write(
            &input,
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": null,
                    "properties": {
                        "id": 42,
                        "Description": "<table><tr><th>K</th><td>V</td></tr></table>"
                    }
                }]
            })
            .to_string(),
        )
        .await
        .unwrap();

        let args = CleanArgs {
            input: input.clone(),
            output: Some(output.clone()),
            strict: true,
            preview: false,
        };
        let stats = clean(&args, &Config::default()).await.unwrap();

        let written: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&output).await.unwrap()).unwrap();
        tokio::fs::remove_file(&input).await.ok();
        tokio::fs::remove_file(&output).await.ok();

        assert_eq!(stats.cleaned, 1);
        assert_eq!(
            written["features"][0]["properties"],
            json!({ "id": 42, "K": "V" })
        );
    }

    #[tokio::test]
    async fn clean_rejects_invalid_document() {
        let input = temp_path("clean_bad.geojson");
        tokio::fs::write(&input, "{\"type\":\"FeatureCollection\"}")
            .await
            .unwrap();

        let args = CleanArgs {
            input: input.clone(),
            output: None,
            strict: false,
            preview: false,
        };
        let result = clean(&args, &Config::default()).await;
        tokio::fs::remove_file(&input).await.ok();

        assert!(matches!(result, Err(CommandError::InvalidGeoJson(_))));
    }

    #[tokio::test]
    async fn clean_reports_missing_file() {
        let args = CleanArgs {
            input: Path::new("/no/such/input.geojson").to_path_buf(),
            output: None,
            strict: false,
            preview: false,
        };

        assert!(matches!(
            clean(&args, &Config::default()).await,
            Err(CommandError::Ingest(_))
        ));
    }

    #[tokio::test]
    async fn validate_reports_violations() {
        let input = temp_path("openapi_bad.json");
        tokio::fs::write(&input, "{\"openapi\":\"3.0.0\",\"info\":{},\"paths\":{}}")
            .await
            .unwrap();

        let args = ValidateArgs {
            input: input.clone(),
            schema: None,
            format: OutputFormat::Json,
            show: false,
        };
        let result = validate_openapi(&args, &Config::default()).await;
        tokio::fs::remove_file(&input).await.ok();

        assert!(matches!(
            result,
            Err(CommandError::SchemaViolations { count: 2 })
        ));
    }

    #[tokio::test]
    async fn validate_uses_schema_file() {
        let input = temp_path("swagger.json");
        let schema = temp_path("swagger_schema.json");
        tokio::fs::write(&input, "{\"swagger\":\"2.0\"}").await.unwrap();
        tokio::fs::write(&schema, "{\"required\":[\"swagger\",\"info\"]}")
            .await
            .unwrap();

        let args = ValidateArgs {
            input: input.clone(),
            schema: Some(schema.clone()),
            format: OutputFormat::Table,
            show: false,
        };
        let result = validate_openapi(&args, &Config::default()).await;
        tokio::fs::remove_file(&input).await.ok();
        tokio::fs::remove_file(&schema).await.ok();

        assert!(matches!(
            result,
            Err(CommandError::SchemaViolations { count: 1 })
        ));
    }

    #[tokio::test]
    async fn validate_reports_missing_schema_file() {
        let input = temp_path("openapi_schema_missing.json");
        tokio::fs::write(&input, "{}").await.unwrap();

        let args = ValidateArgs {
            input: input.clone(),
            schema: Some(PathBuf::from("/no/such/schema.json")),
            format: OutputFormat::Json,
            show: false,
        };
        let result = validate_openapi(&args, &Config::default()).await;
        tokio::fs::remove_file(&input).await.ok();

        assert!(matches!(result, Err(CommandError::Ingest(_))));
    }

    #[tokio::test]
    async fn validate_accepts_valid_document() {
        let input = temp_path("openapi_ok.json");
        tokio::fs::write(
            &input,
            "{\"openapi\":\"3.0.1\",\"info\":{\"title\":\"t\",\"version\":\"1\"},\"paths\":{}}",
        )
        .await
        .unwrap();

        let args = ValidateArgs {
            input: input.clone(),
            schema: None,
            format: OutputFormat::Table,
            show: true,
        };
        let result = validate_openapi(&args, &Config::default()).await;
        tokio::fs::remove_file(&input).await.ok();

        assert!(result.unwrap().is_empty());
    }
}
