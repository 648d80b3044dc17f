//! Field extraction over parsed HTML and embedded JSON.
//!
//! Extraction never fails an operation. A configured selector that produces
//! nothing degrades to an empty value and records a typed [`FieldMiss`] in
//! the page's [`ExtractReport`], which the engine logs and callers can
//! inspect. An unconfigured selector degrades silently.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::{Map, Value};
use serde_json_path::JsonPath;

use crate::descriptor::FieldSelector;

/// Why a configured field produced no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MissReason {
    /// The selector matched nothing.
    NoMatch,
    /// The CSS selector string failed to parse.
    BadSelector(String),
    /// The JSONPath expression failed to parse.
    BadPath(String),
    /// A match was found but lacked the requested attribute.
    MissingAttr,
    /// The page body did not contain parseable JSON.
    JsonSyntax(String),
    /// The JSONPath parsed but selected no usable records.
    PathMismatch,
    /// A JSON value was present but not representable as text.
    NotText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMiss {
    pub field: &'static str,
    pub reason: MissReason,
}

/// Per-page record of fields that degraded to empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractReport {
    misses: Vec<FieldMiss>,
}

impl ExtractReport {
    pub fn is_clean(&self) -> bool {
        self.misses.is_empty()
    }

    pub fn misses(&self) -> &[FieldMiss] {
        &self.misses
    }

    pub(crate) fn record(&mut self, field: &'static str, reason: MissReason) {
        self.misses.push(FieldMiss { field, reason });
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Single string value per the selector/attribute rules: both set reads the
/// attribute of the first match, selector alone joins matched text, an
/// attribute alone reads it off the scope element.
pub(crate) fn string_value(
    scope: ElementRef<'_>,
    field: &FieldSelector,
) -> Result<String, MissReason> {
    match (field.selector.as_deref(), field.attr.as_deref()) {
        (None, None) => Ok(String::new()),
        (None, Some(attr)) => scope
            .value()
            .attr(attr)
            .map(str::to_string)
            .ok_or(MissReason::MissingAttr),
        (Some(css), attr) => {
            let selector =
                Selector::parse(css).map_err(|e| MissReason::BadSelector(e.to_string()))?;
            let matches: Vec<ElementRef<'_>> = scope.select(&selector).collect();
            if matches.is_empty() {
                return Err(MissReason::NoMatch);
            }
            match attr {
                Some(attr) => matches
                    .iter()
                    .find_map(|el| el.value().attr(attr))
                    .map(str::to_string)
                    .ok_or(MissReason::MissingAttr),
                None => Ok(matches
                    .iter()
                    .map(|el| element_text(*el))
                    .collect::<Vec<_>>()
                    .join(" ")),
            }
        }
    }
}

/// List-shaped variant: selector alone yields one entry per match, an
/// attribute narrows to the first match carrying it.
pub(crate) fn list_value(
    scope: ElementRef<'_>,
    field: &FieldSelector,
) -> Result<Vec<String>, MissReason> {
    match (field.selector.as_deref(), field.attr.as_deref()) {
        (None, None) => Ok(Vec::new()),
        (None, Some(attr)) => scope
            .value()
            .attr(attr)
            .map(|v| vec![v.to_string()])
            .ok_or(MissReason::MissingAttr),
        (Some(css), attr) => {
            let selector =
                Selector::parse(css).map_err(|e| MissReason::BadSelector(e.to_string()))?;
            let matches: Vec<ElementRef<'_>> = scope.select(&selector).collect();
            if matches.is_empty() {
                return Err(MissReason::NoMatch);
            }
            match attr {
                Some(attr) => matches
                    .iter()
                    .find_map(|el| el.value().attr(attr))
                    .map(|v| vec![v.to_string()])
                    .ok_or(MissReason::MissingAttr),
                None => Ok(matches.iter().map(|el| element_text(*el)).collect()),
            }
        }
    }
}

/// `string_value` with the miss recorded and an empty fallback.
pub(crate) fn string_field(
    scope: ElementRef<'_>,
    name: &'static str,
    field: &FieldSelector,
    report: &mut ExtractReport,
) -> String {
    match string_value(scope, field) {
        Ok(value) => value,
        Err(reason) => {
            report.record(name, reason);
            String::new()
        }
    }
}

/// `list_value` with the miss recorded and an empty fallback.
pub(crate) fn list_field(
    scope: ElementRef<'_>,
    name: &'static str,
    field: &FieldSelector,
    report: &mut ExtractReport,
) -> Vec<String> {
    match list_value(scope, field) {
        Ok(values) => values,
        Err(reason) => {
            report.record(name, reason);
            Vec::new()
        }
    }
}

/// Presence test used by pagination rules.
pub(crate) fn selector_matches(scope: ElementRef<'_>, css: &str) -> bool {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).next().is_some(),
        Err(_) => false,
    }
}

/// Row elements for an HTML listing. Zero matches is an empty page, not an
/// error, but it is reported.
pub(crate) fn html_rows<'a>(
    doc: &'a Html,
    name: &'static str,
    css: &str,
    report: &mut ExtractReport,
) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => {
            let rows: Vec<ElementRef<'a>> = doc.select(&selector).collect();
            if rows.is_empty() {
                report.record(name, MissReason::NoMatch);
            }
            rows
        }
        Err(e) => {
            report.record(name, MissReason::BadSelector(e.to_string()));
            Vec::new()
        }
    }
}

/// Recover a JSON body that the HTML parser wrapped in markup: servers
/// answer these endpoints with raw JSON, which parses into a document whose
/// text is the original payload.
pub(crate) fn embedded_json(doc: &Html) -> Result<Value, MissReason> {
    let text: String = doc.root_element().text().collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(MissReason::JsonSyntax("empty document".to_string()));
    }
    serde_json::from_str(text).map_err(|e| MissReason::JsonSyntax(e.to_string()))
}

/// Records selected by a JSONPath. A single array node flattens to its
/// object elements; otherwise each selected object is a record.
pub(crate) fn json_records(value: &Value, path: &str) -> Result<Vec<Map<String, Value>>, MissReason> {
    let parsed = JsonPath::parse(path).map_err(|e| MissReason::BadPath(e.to_string()))?;
    let nodes = parsed.query(value).all();
    let mut records: Vec<Map<String, Value>> = Vec::new();
    if nodes.len() == 1 {
        match nodes[0] {
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(map) = item {
                        records.push(map.clone());
                    }
                }
            }
            Value::Object(map) => records.push(map.clone()),
            _ => {}
        }
    } else {
        for node in nodes {
            if let Value::Object(map) = node {
                records.push(map.clone());
            }
        }
    }
    if records.is_empty() {
        Err(MissReason::PathMismatch)
    } else {
        Ok(records)
    }
}

/// Field lookup on one JSON record; the selector doubles as the key.
pub(crate) fn json_string(
    record: &Map<String, Value>,
    field: &FieldSelector,
) -> Result<String, MissReason> {
    let Some(key) = field.key() else {
        return Ok(String::new());
    };
    match record.get(key) {
        None => Err(MissReason::NoMatch),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(MissReason::NotText),
    }
}

/// `json_string` with the miss recorded and an empty fallback.
pub(crate) fn json_string_field(
    record: &Map<String, Value>,
    name: &'static str,
    field: &FieldSelector,
    report: &mut ExtractReport,
) -> String {
    match json_string(record, field) {
        Ok(value) => value,
        Err(reason) => {
            report.record(name, reason);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn selector_and_attr_reads_first_match_attribute() {
        let page = doc(r#"<div><a href="/one">One</a><a href="/two">Two</a></div>"#);
        let field = FieldSelector::attr("a", "href");
        assert_eq!(string_value(page.root_element(), &field).unwrap(), "/one");
    }

    #[test]
    fn selector_alone_joins_matched_text() {
        let page = doc("<p>alpha</p><p>beta</p>");
        let field = FieldSelector::text("p");
        assert_eq!(string_value(page.root_element(), &field).unwrap(), "alpha beta");
    }

    #[test]
    fn attr_alone_reads_the_scope_element() {
        let page = doc(r#"<div id="row" data-key="k1"><span>x</span></div>"#);
        let row_sel = Selector::parse("#row").unwrap();
        let row = page.select(&row_sel).next().unwrap();
        let field = FieldSelector::own_attr("data-key");
        assert_eq!(string_value(row, &field).unwrap(), "k1");
    }

    #[test]
    fn unconfigured_field_is_silently_empty() {
        let page = doc("<p>x</p>");
        assert_eq!(
            string_value(page.root_element(), &FieldSelector::default()).unwrap(),
            ""
        );
    }

    #[test]
    fn zero_matches_is_a_no_match_miss() {
        let page = doc("<p>x</p>");
        let field = FieldSelector::text("div.absent");
        assert_eq!(
            string_value(page.root_element(), &field).unwrap_err(),
            MissReason::NoMatch
        );
    }

    #[test]
    fn missing_attribute_is_reported() {
        let page = doc("<a>no href</a>");
        let field = FieldSelector::attr("a", "href");
        assert_eq!(
            string_value(page.root_element(), &field).unwrap_err(),
            MissReason::MissingAttr
        );
    }

    #[test]
    fn invalid_selector_is_reported_not_fatal() {
        let page = doc("<p>x</p>");
        let field = FieldSelector::text("p[[");
        let mut report = ExtractReport::default();
        assert_eq!(string_field(page.root_element(), "name", &field, &mut report), "");
        assert!(!report.is_clean());
        assert_eq!(report.misses()[0].field, "name");
    }

    #[test]
    fn list_value_yields_one_entry_per_match() {
        let page = doc("<li>a</li><li>b</li><li>c</li>");
        let field = FieldSelector::text("li");
        assert_eq!(
            list_value(page.root_element(), &field).unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn embedded_json_survives_html_wrapping() {
        let page = doc(r#"{"items":[{"title":"T1"}]}"#);
        let value = embedded_json(&page).unwrap();
        assert_eq!(value["items"][0]["title"], "T1");
    }

    #[test]
    fn embedded_json_rejects_markup_pages() {
        let page = doc("<html><body><p>not json</p></body></html>");
        assert!(matches!(
            embedded_json(&page),
            Err(MissReason::JsonSyntax(_))
        ));
    }

    #[test]
    fn json_records_flattens_a_single_array_node() {
        let value: Value =
            serde_json::from_str(r#"{"items":[{"results":[{"a":1},{"a":2}]}]}"#).unwrap();
        let records = json_records(&value, "$.items[0].results").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn json_records_accepts_per_node_selection() {
        let value: Value = serde_json::from_str(r#"{"items":[{"a":1},{"a":2},{"a":3}]}"#).unwrap();
        let records = json_records(&value, "$.items[*]").unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn json_records_misses_on_scalar_paths() {
        let value: Value = serde_json::from_str(r#"{"count":5}"#).unwrap();
        assert_eq!(
            json_records(&value, "$.count").unwrap_err(),
            MissReason::PathMismatch
        );
    }

    #[test]
    fn json_string_coerces_numbers() {
        let value: Value = serde_json::from_str(r#"{"id":42,"title":"T"}"#).unwrap();
        let Value::Object(record) = value else {
            unreachable!()
        };
        assert_eq!(
            json_string(&record, &FieldSelector::text("id")).unwrap(),
            "42"
        );
        assert_eq!(
            json_string(&record, &FieldSelector::text("missing")).unwrap_err(),
            MissReason::NoMatch
        );
    }
}
