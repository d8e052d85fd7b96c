//! HTML description table extraction.
//!
//! GIS exporters (KML writers in particular) pack a feature's attributes
//! into an HTML `<table>` stored in the `Description` property. This module
//! parses that markup with `scraper` and turns every row that has a key cell
//! and a value cell into a string property.
//!
//! Parsing goes through html5ever's document tree builder, which never
//! fails: unclosed tags are closed, unknown tags are ignored, and table
//! markup outside a `<table>` is dropped the same way a browser drops it.
//! `<template>` contents are inert in a browser, so rows and text inside a
//! template are skipped here as well.

use std::sync::LazyLock;

use data_tools_geojson_models::Properties;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").unwrap_or_else(|_| unreachable!()));

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").unwrap_or_else(|_| unreachable!()));

/// A key/value pair read from one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Trimmed text of the first cell. Never empty.
    pub key: String,
    /// Trimmed text of the second cell. May be empty.
    pub value: String,
}

/// Reads every usable row from an HTML fragment, in document order.
///
/// Rows with fewer than two `th`/`td` cells, or whose key text is empty
/// after trimming, are skipped. Cells beyond the second are ignored.
#[must_use]
pub fn rows(html: &str) -> Vec<TableRow> {
    let document = Html::parse_document(html);

    document
        .select(&ROW_SELECTOR)
        .filter(|row| !in_template(*row))
        .filter_map(|row| {
            let mut cells = row.select(&CELL_SELECTOR).filter(|cell| !in_template(*cell));
            let key_cell = cells.next()?;
            let value_cell = cells.next()?;

            let key = text_content(key_cell);
            if key.is_empty() {
                return None;
            }

            Some(TableRow {
                key,
                value: text_content(value_cell),
            })
        })
        .collect()
}

/// Extracts the description table into a property mapping.
///
/// Keys keep first-seen order; a key repeated in a later row takes that
/// row's value.
#[must_use]
pub fn extract_properties(html: &str) -> Properties {
    let mut properties = Properties::new();
    for TableRow { key, value } in rows(html) {
        properties.insert(key, Value::String(value));
    }
    properties
}

/// Concatenated descendant text of an element, trimmed. Text inside a
/// nested `<template>` does not count.
fn text_content(element: ElementRef<'_>) -> String {
    let text: String = element
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != element.id())
                .any(|ancestor| is_template(ancestor.value()))
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect();

    trim(&text).to_owned()
}

fn in_template(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .any(|ancestor| is_template(ancestor.value()))
}

fn is_template(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|element| element.name() == "template")
}

/// Trims the characters JS `String.prototype.trim` strips: Unicode
/// whitespace except U+0085, plus the byte-order mark.
fn trim(text: &str) -> &str {
    text.trim_matches(|c: char| (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}')
}
