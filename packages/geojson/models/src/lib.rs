#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` document and feature types.
//!
//! These types are deliberately loose: a [`Document`] only requires a
//! `features` array of JSON objects, and every other member (geometry,
//! `crs`, foreign members) is carried through untouched and in source order.
//! Structural `GeoJSON` validation lives in `data_tools_geojson`.

use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

/// Attribute mapping attached to a [`Feature`].
pub type Properties = Map<String, Value>;

/// Property holding the HTML attribute table written by GIS exporters.
pub const DESCRIPTION_KEY: &str = "Description";

/// Top-level member holding the feature sequence.
pub const FEATURES_KEY: &str = "features";

/// Feature member holding the attribute mapping.
pub const PROPERTIES_KEY: &str = "properties";

/// Errors raised when decoding a [`Document`].
///
/// All variants describe input that is not a usable feature collection.
/// Callers should report them and never attempt partial processing.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is not a JSON object.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// The top-level object has no `features` member.
    #[error("document has no `features` member")]
    MissingFeatures,

    /// The `features` member is not an array.
    #[error("`features` is not an array")]
    FeaturesNotArray,

    /// An entry of `features` is not a JSON object.
    #[error("feature at index {index} is not a JSON object")]
    FeatureNotObject {
        /// Zero-based position in the `features` array.
        index: usize,
    },
}

/// A single feature record.
///
/// Wraps the feature's JSON object as-is. Only the `properties` member is
/// ever rewritten by the cleaner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feature(Map<String, Value>);

impl Feature {
    /// Wraps an existing feature object.
    #[must_use]
    pub const fn new(members: Map<String, Value>) -> Self {
        Self(members)
    }

    /// Returns the `properties` object, if the member is present and is an
    /// object. `null` or non-object values are reported as `None`.
    #[must_use]
    pub fn properties(&self) -> Option<&Properties> {
        self.0.get(PROPERTIES_KEY).and_then(Value::as_object)
    }

    /// Returns the raw `Description` property value, if any.
    #[must_use]
    pub fn description(&self) -> Option<&Value> {
        self.properties()?.get(DESCRIPTION_KEY)
    }

    /// Replaces the `properties` member, keeping its position if it was
    /// already present.
    pub fn set_properties(&mut self, properties: Properties) {
        self.0
            .insert(PROPERTIES_KEY.to_owned(), Value::Object(properties));
    }

    /// Returns all members of the feature object.
    #[must_use]
    pub const fn members(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Feature> for Value {
    fn from(feature: Feature) -> Self {
        Self::Object(feature.0)
    }
}

/// A decoded feature collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Top-level members in source order. The `features` entry stays in the
    /// map as a `null` placeholder so its position survives serialization.
    members: Map<String, Value>,
    features: Vec<Feature>,
}

impl Document {
    /// Decodes a document from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the value is not an object, has no
    /// `features` array, or any feature is not an object.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(mut members) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let raw = members
            .get_mut(FEATURES_KEY)
            .ok_or(DocumentError::MissingFeatures)?
            .take();

        let Value::Array(items) = raw else {
            return Err(DocumentError::FeaturesNotArray);
        };

        let features = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(Feature::new(map)),
                _ => Err(DocumentError::FeatureNotObject { index }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { members, features })
    }

    /// Decodes a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] if the text is not JSON, or any of
    /// the shape errors from [`Self::from_value`].
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Decodes a document from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_json_str`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Returns the features in order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Returns the features for in-place editing.
    ///
    /// The slice cannot grow or shrink, so the feature count is fixed for
    /// the lifetime of the document.
    #[must_use]
    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the document has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Re-assembles the document into a single JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        let Self {
            mut members,
            features,
        } = self;

        members.insert(
            FEATURES_KEY.to_owned(),
            Value::Array(features.into_iter().map(Value::from).collect()),
        );

        Value::Object(members)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for (key, value) in &self.members {
            if key == FEATURES_KEY {
                map.serialize_entry(key, &self.features)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
