#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! OpenAPI validation issue types.
//!
//! A [`ValidationIssue`] is one schema violation reported by the validator,
//! shaped after the error objects JSON Schema engines emit. [`IssueKind`]
//! maps the failing keyword to the label shown in the issue table.

use serde::{Deserialize, Serialize};

/// Keyword reported when an object has a property the schema forbids.
pub const KEYWORD_ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// Keyword reported when a required property is absent.
pub const KEYWORD_REQUIRED: &str = "required";

/// Keyword reported when a value has the wrong JSON type.
pub const KEYWORD_TYPE: &str = "type";

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// JSON pointer to the offending value in the document (e.g. `/info`).
    pub instance_path: String,
    /// JSON pointer to the failing keyword in the schema.
    pub schema_path: String,
    /// The failing schema keyword (e.g. `required`).
    pub keyword: String,
    /// Property name for `required` failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_property: Option<String>,
    /// Property name for `additionalProperties` failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_property: Option<String>,
    /// Human-readable message from the validator.
    pub message: String,
}

impl ValidationIssue {
    /// Classifies the issue by its keyword.
    #[must_use]
    pub fn kind(&self) -> IssueKind {
        IssueKind::from_keyword(&self.keyword)
    }

    /// The property the issue is about.
    ///
    /// The unexpected property for `additionalProperties` failures, else the
    /// missing property if one was reported, else the instance path.
    #[must_use]
    pub fn property(&self) -> &str {
        if self.keyword == KEYWORD_ADDITIONAL_PROPERTIES {
            return self.additional_property.as_deref().unwrap_or_default();
        }

        match self.missing_property.as_deref() {
            Some(missing) if !missing.is_empty() => missing,
            _ => &self.instance_path,
        }
    }
}

/// Display classification of a [`ValidationIssue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    /// `additionalProperties`
    UnknownProperty,
    /// `required`
    MissingProperty,
    /// `type`
    InvalidType,
    /// Any other keyword, kept verbatim.
    Other(String),
}

impl IssueKind {
    /// Maps a schema keyword to its kind.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            KEYWORD_ADDITIONAL_PROPERTIES => Self::UnknownProperty,
            KEYWORD_REQUIRED => Self::MissingProperty,
            KEYWORD_TYPE => Self::InvalidType,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Label for the "Error Type" column.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::UnknownProperty => "Unknown Property",
            Self::MissingProperty => "Missing Property",
            Self::InvalidType => "Invalid Type",
            Self::Other(keyword) => keyword,
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
