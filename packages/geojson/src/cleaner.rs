//! Description-table flattening.
//!
//! Rewrites each feature's `properties` so that the rows of the HTML table
//! in `Description` become plain string properties, then drops
//! `Description`. Running the cleaner on its own output changes nothing.

use std::borrow::Cow;

use data_tools_geojson_models::{DESCRIPTION_KEY, Document, Feature, Properties};
use serde_json::Value;

use crate::CleanError;
use crate::description_table::extract_properties;

/// Counters reported by [`flatten_in_place`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Features in the document.
    pub features: usize,
    /// Features whose `Description` was flattened and removed.
    pub cleaned: usize,
    /// Properties extracted across all cleaned features, after
    /// de-duplication within each table.
    pub extracted: usize,
}

/// Flattens every feature of `document` and returns it.
#[must_use]
pub fn flatten(mut document: Document) -> Document {
    flatten_in_place(&mut document);
    document
}

/// Flattens every feature of `document` in place.
pub fn flatten_in_place(document: &mut Document) -> FlattenStats {
    let mut stats = FlattenStats {
        features: document.len(),
        ..FlattenStats::default()
    };

    for (index, feature) in document.features_mut().iter_mut().enumerate() {
        if let Some(extracted) = flatten_feature(feature) {
            log::debug!("Feature {index}: extracted {extracted} properties from description");
            stats.cleaned += 1;
            stats.extracted += extracted;
        }
    }

    log::info!(
        "Cleaned {} of {} features ({} properties extracted)",
        stats.cleaned,
        stats.features,
        stats.extracted
    );

    stats
}

/// Flattens a single feature.
///
/// Returns the number of extracted properties, or `None` when the feature
/// has no truthy `Description` and was left untouched.
pub fn flatten_feature(feature: &mut Feature) -> Option<usize> {
    let properties = feature.properties()?;
    let description = properties.get(DESCRIPTION_KEY)?;

    if !is_truthy(description) {
        return None;
    }

    if !description.is_string() {
        log::debug!("Description is not a string ({description}), parsing its string form");
    }

    let extracted = extract_properties(&markup_of(description));
    let count = extracted.len();

    let mut merged: Properties = properties
        .iter()
        .filter(|(key, _)| key.as_str() != DESCRIPTION_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in extracted {
        if key != DESCRIPTION_KEY {
            merged.insert(key, value);
        }
    }

    feature.set_properties(merged);

    Some(count)
}

/// Decodes `value` as a document and flattens it.
///
/// # Errors
///
/// Returns [`CleanError::InvalidInput`] if `value` is not a feature
/// collection.
pub fn flatten_value(value: Value) -> Result<Value, CleanError> {
    let document = Document::from_value(value)?;
    Ok(flatten(document).into_value())
}

/// Decodes JSON text as a document and flattens it.
///
/// # Errors
///
/// Returns [`CleanError::InvalidInput`] if the text is not JSON or not a
/// feature collection.
pub fn flatten_str(text: &str) -> Result<Document, CleanError> {
    let document = Document::from_json_str(text)?;
    Ok(flatten(document))
}

/// The markup a browser parser would receive for `value`: arrays join their
/// elements with `,` (nested arrays recursively, `null` elements as empty),
/// objects become `[object Object]`.
fn markup_of(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => markup_of(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Null => Cow::Borrowed("null"),
    }
}

/// `null`, `false`, zero and the empty string count as "no description".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use data_tools_geojson_models::DocumentError;
    use serde_json::json;

    use super::*;

    fn doc(features: &Value) -> Document {
        Document::from_value(json!({ "type": "FeatureCollection", "features": features })).unwrap()
    }

    fn props(document: &Document, index: usize) -> Value {
        document.features()[index].members()["properties"].clone()
    }

    #[test]
    fn leaves_features_without_description_untouched() {
        let input = doc(&json!([
            { "type": "Feature", "properties": { "id": 1, "name": "a" } },
            { "type": "Feature", "properties": {} },
            { "type": "Feature" },
            { "type": "Feature", "properties": null }
        ]));

        let output = flatten(input.clone());

        assert_eq!(output, input);
    }

    #[test]
    fn falsy_description_is_kept() {
        let input = doc(&json!([
            { "properties": { "Description": "" } },
            { "properties": { "Description": null } },
            { "properties": { "Description": false } },
            { "properties": { "Description": 0 } }
        ]));

        let output = flatten(input.clone());

        assert_eq!(output, input);
    }

    #[test]
    fn preserves_unrelated_properties() {
        let output = flatten(doc(&json!([{
            "properties": {
                "id": 42,
                "Description": "<table><tr><th>K</th><td>V</td></tr></table>"
            }
        }])));

        assert_eq!(props(&output, 0), json!({ "id": 42, "K": "V" }));
    }

    #[test]
    fn removes_description_even_without_rows() {
        let output = flatten(doc(&json!([
            { "properties": { "Description": "plain text, no table" } },
            { "properties": { "Description": "<table><tr><th>OnlyKey</th></tr></table>" } }
        ])));

        assert_eq!(props(&output, 0), json!({}));
        assert_eq!(props(&output, 1), json!({}));
    }

    #[test]
    fn non_string_description_is_removed() {
        let output = flatten(doc(&json!([
            { "properties": { "a": 1, "Description": { "nested": true } } },
            { "properties": { "Description": 12 } }
        ])));

        assert_eq!(props(&output, 0), json!({ "a": 1 }));
        assert_eq!(props(&output, 1), json!({}));
    }

    #[test]
    fn array_description_is_joined_and_parsed() {
        let output = flatten(doc(&json!([
            { "properties": { "Description": ["<table><tr><td>K</td><td>V</td></tr></table>"] } },
            {
                "properties": {
                    "id": 3,
                    "Description": ["<table><tr><td>A</td><td>1</td></tr>", null, "<tr><td>B</td><td>2</td></tr></table>"]
                }
            }
        ])));

        assert_eq!(props(&output, 0), json!({ "K": "V" }));
        assert_eq!(props(&output, 1), json!({ "id": 3, "A": "1", "B": "2" }));
    }

    #[test]
    fn markup_of_follows_string_conversion() {
        assert_eq!(markup_of(&json!("<b>x</b>")), "<b>x</b>");
        assert_eq!(markup_of(&json!(["a", null, 1, true, ["b", "c"]])), "a,,1,true,b,c");
        assert_eq!(markup_of(&json!({ "k": 1 })), "[object Object]");
        assert_eq!(markup_of(&json!([])), "");
    }

    #[test]
    fn last_row_wins() {
        let output = flatten(doc(&json!([{
            "properties": {
                "Description": "<table><tr><th>Name</th><td>Fido</td></tr><tr><th>Name</th><td>Rex</td></tr></table>"
            }
        }])));

        assert_eq!(props(&output, 0), json!({ "Name": "Rex" }));
    }

    #[test]
    fn extracted_keys_override_existing_in_place() {
        let output = flatten(doc(&json!([{
            "properties": {
                "Name": "old",
                "Description": "<table><tr><td>Extra</td><td>1</td></tr><tr><td>Name</td><td>new</td></tr></table>",
                "tail": true
            }
        }])));

        let properties = props(&output, 0);
        let keys: Vec<&str> = properties
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(keys, ["Name", "tail", "Extra"]);
        assert_eq!(properties["Name"], json!("new"));
        assert_eq!(properties["Extra"], json!("1"));
    }

    #[test]
    fn extracted_description_row_is_dropped() {
        let output = flatten(doc(&json!([{
            "properties": {
                "Description": "<table><tr><td>Description</td><td>inner</td></tr><tr><td>K</td><td>V</td></tr></table>"
            }
        }])));

        assert_eq!(props(&output, 0), json!({ "K": "V" }));
    }

    #[test]
    fn lowercase_description_is_an_ordinary_property() {
        let output = flatten(doc(&json!([{
            "properties": {
                "description": "<table><tr><td>K</td><td>V</td></tr></table>"
            }
        }])));

        assert_eq!(
            props(&output, 0),
            json!({ "description": "<table><tr><td>K</td><td>V</td></tr></table>" })
        );
    }

    #[test]
    fn only_properties_member_changes() {
        let output = flatten(doc(&json!([{
            "type": "Feature",
            "id": "f1",
            "geometry": { "type": "Point", "coordinates": [1.5, 2.5] },
            "properties": { "Description": "<table><tr><td>K</td><td>V</td></tr></table>" }
        }])));

        assert_eq!(
            Value::from(output.features()[0].clone()),
            json!({
                "type": "Feature",
                "id": "f1",
                "geometry": { "type": "Point", "coordinates": [1.5, 2.5] },
                "properties": { "K": "V" }
            })
        );
    }

    #[test]
    fn flattening_is_idempotent() {
        let input = doc(&json!([
            { "properties": { "Description": "<table><tr><th> Color </th><td>  Brown  </td></tr></table>" } },
            { "properties": { "x": [1, 2] } },
            { "properties": { "Description": "" } }
        ]));

        let once = flatten(input);
        let twice = flatten(once.clone());

        assert_eq!(once, twice);
        assert_eq!(props(&once, 0), json!({ "Color": "Brown" }));
    }

    #[test]
    fn feature_count_is_unchanged() {
        let input = doc(&json!([
            { "properties": { "Description": "<table><tr><td>a</td><td>b</td></tr></table>" } },
            {},
            { "properties": { "Description": "<p>nothing</p>" } }
        ]));
        let before = input.len();

        assert_eq!(flatten(input).len(), before);
    }

    #[test]
    fn reports_stats() {
        let mut document = doc(&json!([
            { "properties": { "Description": "<table><tr><td>a</td><td>1</td></tr><tr><td>b</td><td>2</td></tr></table>" } },
            { "properties": { "Description": "<table><tr><td>a</td><td>1</td></tr><tr><td>a</td><td>2</td></tr></table>" } },
            { "properties": { "id": 3 } }
        ]));

        let stats = flatten_in_place(&mut document);

        assert_eq!(
            stats,
            FlattenStats {
                features: 3,
                cleaned: 2,
                extracted: 3,
            }
        );
    }

    #[test]
    fn flatten_value_rejects_invalid_shapes() {
        assert!(matches!(
            flatten_value(json!({ "type": "FeatureCollection" })),
            Err(CleanError::InvalidInput(DocumentError::MissingFeatures))
        ));
        assert!(matches!(
            flatten_value(json!({ "features": "nope" })),
            Err(CleanError::InvalidInput(DocumentError::FeaturesNotArray))
        ));
    }

    #[test]
    fn flatten_str_cleans_text() {
        let text = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"Description":"<table><tr><td>K</td><td>V</td></tr></table>"},"geometry":null}]}"#;

        let output = flatten_str(text).unwrap();

        assert_eq!(
            serde_json::to_string(&output).unwrap(),
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"K":"V"},"geometry":null}]}"#
        );
    }

    #[test]
    fn flatten_str_rejects_non_json() {
        assert!(matches!(
            flatten_str("not json"),
            Err(CleanError::InvalidInput(DocumentError::Json(_)))
        ));
    }
}
