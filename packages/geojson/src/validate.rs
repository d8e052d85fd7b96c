//! Structural `GeoJSON` check.
//!
//! The cleaner itself only needs a `features` array. This module runs the
//! document through the `geojson` crate so callers can refuse output that
//! is not a well-formed `FeatureCollection` (bad geometry, missing `type`
//! members and so on).

use data_tools_geojson_models::Document;
use geojson::GeoJson;

use crate::CleanError;

/// Verifies that `document` parses as a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`CleanError::InvalidGeoJson`] describing the first structural
/// problem found.
pub fn check_geojson(document: &Document) -> Result<(), CleanError> {
    let value = document.clone().into_value();

    match GeoJson::from_json_value(value) {
        Ok(GeoJson::FeatureCollection(collection)) => {
            log::debug!(
                "Document is a valid FeatureCollection with {} features",
                collection.features.len()
            );
            Ok(())
        }
        Ok(GeoJson::Feature(_)) => Err(CleanError::InvalidGeoJson(
            "expected a FeatureCollection, found a Feature".to_owned(),
        )),
        Ok(GeoJson::Geometry(_)) => Err(CleanError::InvalidGeoJson(
            "expected a FeatureCollection, found a Geometry".to_owned(),
        )),
        Err(e) => Err(CleanError::InvalidGeoJson(e.to_string())),
    }
}
