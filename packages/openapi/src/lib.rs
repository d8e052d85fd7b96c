#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! OpenAPI 3 document validation.
//!
//! Schema semantics are left entirely to the `jsonschema` engine. This crate
//! compiles the schema (the official OpenAPI 3.0 document schema, or one the
//! caller supplies) and converts the engine's errors into
//! [`ValidationIssue`]s for display.
//!
//! The engine reports a failed `oneOf`/`anyOf` as a single error. Each
//! branch is re-validated on its own so the nested failures (a response
//! missing its `description`, a parameter missing `name`) are listed too,
//! before the combinator's own issue.

use data_tools_openapi_models::{KEYWORD_ADDITIONAL_PROPERTIES, ValidationIssue};
use jsonschema::{ValidationError, Validator, error::ValidationErrorKind};
use serde_json::{Map, Value};

/// Official OpenAPI 3.0 schema (`https://spec.openapis.org/oas/3.0/schema/2021-09-28`).
const OPENAPI_3_0_SCHEMA: &str = include_str!("../schemas/openapi-3.0.json");

const KEYWORD_ONE_OF: &str = "oneOf";
const KEYWORD_ANY_OF: &str = "anyOf";

/// Nesting limit for branch expansion.
const MAX_BRANCH_DEPTH: usize = 3;

/// Schema path prefix of the wrapped branch in a branch schema.
const BRANCH_PREFIX: &str = "/allOf/0";

/// `$ref` hops allowed while resolving one schema path.
const MAX_REF_HOPS: usize = 32;

/// Errors that can occur while preparing or running validation.
#[derive(Debug, thiserror::Error)]
pub enum OpenApiError {
    /// The document or schema is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema could not be compiled.
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Compiled validator for OpenAPI documents.
pub struct OpenApiValidator {
    schema: Value,
    validator: Validator,
}

impl std::fmt::Debug for OpenApiValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenApiValidator").finish_non_exhaustive()
    }
}

impl OpenApiValidator {
    /// Compiles the embedded OpenAPI 3.0 schema.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError`] if the embedded schema fails to compile.
    pub fn new() -> Result<Self, OpenApiError> {
        Self::from_schema_str(OPENAPI_3_0_SCHEMA)
    }

    /// Compiles a caller-supplied JSON schema.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError::Schema`] if the schema is invalid.
    pub fn from_schema(schema: &Value) -> Result<Self, OpenApiError> {
        let validator = compile(schema)?;
        Ok(Self {
            schema: schema.clone(),
            validator,
        })
    }

    /// Parses and compiles JSON schema text.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError`] if the text is not JSON or not a valid
    /// schema.
    pub fn from_schema_str(text: &str) -> Result<Self, OpenApiError> {
        let schema: Value = serde_json::from_str(text)?;
        Self::from_schema(&schema)
    }

    /// Validates a parsed document, returning every issue found.
    ///
    /// An empty list means the document is valid.
    #[must_use]
    pub fn validate(&self, document: &Value) -> Vec<ValidationIssue> {
        let issues = collect_issues(&self.schema, &self.validator, document, 0);

        log::info!("OpenAPI validation found {} issue(s)", issues.len());

        issues
    }

    /// Validates JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError::Json`] if the text is not JSON.
    pub fn validate_str(&self, text: &str) -> Result<Vec<ValidationIssue>, OpenApiError> {
        let document: Value = serde_json::from_str(text)?;
        Ok(self.validate(&document))
    }
}

fn compile(schema: &Value) -> Result<Validator, OpenApiError> {
    jsonschema::validator_for(schema).map_err(|e| OpenApiError::Schema(e.to_string()))
}

fn collect_issues(
    schema: &Value,
    validator: &Validator,
    instance: &Value,
    depth: usize,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for error in validator.iter_errors(instance) {
        let schema_path = error.schema_path.to_string();
        if depth < MAX_BRANCH_DEPTH
            && matches!(keyword_of(&schema_path), KEYWORD_ONE_OF | KEYWORD_ANY_OF)
        {
            issues.extend(branch_issues(schema, &error, &schema_path, depth));
        }
        issues.extend(to_issues(&error));
    }

    issues
}

/// Re-validates the failing instance against every branch of a `oneOf` /
/// `anyOf` keyword. Paths are rebased onto the outer error.
fn branch_issues(
    schema: &Value,
    error: &ValidationError<'_>,
    schema_path: &str,
    depth: usize,
) -> Vec<ValidationIssue> {
    let Some(branches) = resolve(schema, schema_path).and_then(Value::as_array) else {
        log::debug!("Cannot resolve {schema_path} in the schema, skipping branch issues");
        return Vec::new();
    };

    let instance_path = error.instance_path.to_string();
    let mut issues = Vec::new();

    for (index, branch) in branches.iter().enumerate() {
        let wrapped = branch_schema(schema, branch);
        let validator = match compile(&wrapped) {
            Ok(validator) => validator,
            Err(e) => {
                log::debug!("Skipping branch {schema_path}/{index}: {e}");
                continue;
            }
        };

        for issue in collect_issues(&wrapped, &validator, &error.instance, depth + 1) {
            let nested = issue
                .schema_path
                .strip_prefix(BRANCH_PREFIX)
                .unwrap_or(&issue.schema_path);
            let rebased_schema_path = format!("{schema_path}/{index}{nested}");
            let rebased_instance_path = format!("{instance_path}{}", issue.instance_path);

            issues.push(ValidationIssue {
                instance_path: rebased_instance_path,
                schema_path: rebased_schema_path,
                ..issue
            });
        }
    }

    issues
}

/// A standalone schema for one branch that still resolves the root's
/// local `$ref`s.
fn branch_schema(schema: &Value, branch: &Value) -> Value {
    let mut wrapper = Map::new();
    for key in ["$schema", "definitions", "$defs"] {
        if let Some(value) = schema.get(key) {
            wrapper.insert(key.to_owned(), value.clone());
        }
    }
    wrapper.insert("allOf".to_owned(), Value::Array(vec![branch.clone()]));
    Value::Object(wrapper)
}

/// Follows a schema path through `schema`, hopping over `$ref`s. Object
/// keys that contain `/` (such as the `^\/` pattern) are matched across
/// several segments.
fn resolve<'a>(schema: &'a Value, schema_path: &str) -> Option<&'a Value> {
    let segments: Vec<String> = schema_path
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect();

    let mut current = schema;
    let mut rest = segments.as_slice();
    let mut hops = 0;

    while let Some(segment) = rest.first() {
        if segment == "$ref" {
            current = follow_ref(schema, current, &mut hops)?;
            rest = &rest[1..];
            continue;
        }

        match current {
            Value::Array(items) => {
                current = items.get(segment.parse::<usize>().ok()?)?;
                rest = &rest[1..];
            }
            Value::Object(map) => {
                if let Some((value, used)) = lookup(map, rest) {
                    current = value;
                    rest = &rest[used..];
                } else if map.contains_key("$ref") {
                    current = follow_ref(schema, current, &mut hops)?;
                } else {
                    return None;
                }
            }
            _ => return None,
        }
    }

    Some(current)
}

fn lookup<'a>(map: &'a Map<String, Value>, segments: &[String]) -> Option<(&'a Value, usize)> {
    let mut key = String::new();
    for (count, segment) in segments.iter().enumerate() {
        if count > 0 {
            key.push('/');
        }
        key.push_str(segment);
        if let Some(value) = map.get(&key) {
            return Some((value, count + 1));
        }
    }
    None
}

/// Local references only (`#/definitions/...`).
fn follow_ref<'a>(schema: &'a Value, current: &Value, hops: &mut usize) -> Option<&'a Value> {
    *hops += 1;
    if *hops > MAX_REF_HOPS {
        return None;
    }
    let reference = current.get("$ref")?.as_str()?;
    schema.pointer(reference.strip_prefix('#')?)
}

/// Converts one engine error into issues. `additionalProperties` failures
/// produce one issue per unexpected property.
fn to_issues(error: &ValidationError<'_>) -> Vec<ValidationIssue> {
    let schema_path = error.schema_path.to_string();
    let base = ValidationIssue {
        instance_path: error.instance_path.to_string(),
        keyword: keyword_of(&schema_path).to_owned(),
        schema_path,
        missing_property: None,
        additional_property: None,
        message: error.to_string(),
    };

    match &error.kind {
        ValidationErrorKind::AdditionalProperties { unexpected, .. }
            if base.keyword == KEYWORD_ADDITIONAL_PROPERTIES && !unexpected.is_empty() =>
        {
            unexpected
                .iter()
                .map(|property| ValidationIssue {
                    additional_property: Some(property.clone()),
                    ..base.clone()
                })
                .collect()
        }
        ValidationErrorKind::Required { property, .. } => vec![ValidationIssue {
            missing_property: Some(
                property
                    .as_str()
                    .map_or_else(|| property.to_string(), str::to_owned),
            ),
            ..base
        }],
        _ => vec![base],
    }
}

/// Last non-index segment of a schema path (`/properties/info/required`
/// -> `required`).
fn keyword_of(schema_path: &str) -> &str {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or_default()
}
