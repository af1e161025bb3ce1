//! Field-level conversion between CSV text and stored JSON values.
//!
//! Absent values are JSON `null`. On import `NA`, `None` and `NULL` become
//! `null` while an empty cell stays an empty string; on export `null` is
//! written as [`EXPORT_NULL`].

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use datacat_rules::{Datatype, RuleRegistry};
use regex::Regex;
use serde_json::Value;

pub const MULTI_SEPARATOR: char = '|';
pub const NULL_SENTINELS: [&str; 3] = ["NA", "None", "NULL"];
pub const EXPORT_NULL: &str = "NA";

pub fn is_null_sentinel(raw: &str) -> bool {
    NULL_SENTINELS.contains(&raw)
}

fn date_re() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[T ](\d{2}:\d{2}(?::\d{2})?))?").unwrap()
    })
}

/// `2021-01-01T00:04:00.000Z` -> `2021-01-01T00:04:00`. Text that is not a date is kept.
pub fn strip_date(raw: &str) -> String {
    let Some(caps) = date_re().captures(raw.trim()) else {
        return raw.to_string();
    };
    let day = &caps[1];
    match caps.get(2) {
        None => day.to_string(),
        Some(time) => {
            let time = if time.as_str().len() == 5 {
                format!("{}:00", time.as_str())
            } else {
                time.as_str().to_string()
            };
            let joined = format!("{day}T{time}");
            match NaiveDateTime::parse_from_str(&joined, "%Y-%m-%dT%H:%M:%S") {
                Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
                Err(_) => raw.to_string(),
            }
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Convert one CSV scalar according to `datatype`.
pub fn import_scalar(datatype: Datatype, raw: &str) -> Value {
    if is_null_sentinel(raw) {
        return Value::Null;
    }
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match datatype {
        Datatype::Boolean => match parse_bool(raw) {
            Some(b) => Value::Bool(b),
            None => Value::String(raw.to_string()),
        },
        Datatype::Date => Value::String(strip_date(raw)),
        Datatype::Integer => match raw.trim().parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(raw.to_string()),
        },
        Datatype::Object => Value::String(raw.to_string()),
        Datatype::String | Datatype::Id | Datatype::Url | Datatype::Email => {
            Value::String(raw.to_string())
        }
    }
}

/// Render one stored scalar according to `datatype`.
pub fn export_scalar(datatype: Datatype, value: &Value) -> String {
    match value {
        Value::Null => EXPORT_NULL.to_string(),
        Value::String(s) if s.is_empty() => String::new(),
        _ => match datatype {
            Datatype::Boolean => match value {
                Value::Bool(b) => b.to_string(),
                other => plain(other),
            },
            Datatype::Date => match value {
                Value::String(s) => strip_date(s),
                other => plain(other),
            },
            Datatype::Integer
            | Datatype::Object
            | Datatype::String
            | Datatype::Id
            | Datatype::Url
            | Datatype::Email => plain(value),
        },
    }
}

/// Text without JSON quoting; containers become compact JSON.
fn plain(value: &Value) -> String {
    match value {
        Value::Null => EXPORT_NULL.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

pub fn import_multiple(datatype: Datatype, raw: &str) -> Value {
    if is_null_sentinel(raw) {
        return Value::Null;
    }
    if raw.is_empty() {
        return Value::Array(Vec::new());
    }
    Value::Array(
        raw.split(MULTI_SEPARATOR)
            .map(|part| import_scalar(datatype, part))
            .collect(),
    )
}

/// Join list elements with `|`, dropping absent ones.
pub fn export_multiple(datatype: Datatype, value: &Value) -> String {
    match value {
        Value::Array(items) => join(items.iter().filter(|v| !v.is_null()).map(|v| export_scalar(datatype, v))),
        other => export_scalar(datatype, other),
    }
}

pub(crate) fn join<I: Iterator<Item = String>>(parts: I) -> String {
    parts.collect::<Vec<_>>().join(&MULTI_SEPARATOR.to_string())
}

fn heuristic_scalar(raw: &str) -> Value {
    match raw {
        "true" | "True" => Value::Bool(true),
        "false" | "False" => Value::Bool(false),
        s if is_null_sentinel(s) => Value::Null,
        s => Value::String(s.to_string()),
    }
}

/// Casting used when no rule describes a column. Never fails.
pub fn heuristic_import(raw: &str) -> Value {
    if raw.contains(MULTI_SEPARATOR) {
        Value::Array(raw.split(MULTI_SEPARATOR).map(heuristic_scalar).collect())
    } else {
        heuristic_scalar(raw)
    }
}

pub fn heuristic_export(value: &Value) -> String {
    match value {
        Value::Array(items) => join(items.iter().filter(|v| !v.is_null()).map(heuristic_export)),
        other => plain(other),
    }
}

/// Import direction for `model.field`; unknown fields fall back to [`heuristic_import`].
pub fn coerce_import(registry: &RuleRegistry, model: &str, field: &str, raw: &str) -> Value {
    match registry.get(model, field) {
        Some(rule) if rule.multiple => import_multiple(rule.datatype, raw),
        Some(rule) => import_scalar(rule.datatype, raw),
        None => {
            tracing::trace!(event = "heuristic_import", model, field);
            heuristic_import(raw)
        }
    }
}

/// Export direction without reference resolution. See [`crate::coerce_export`]
/// for the variant that also resolves external models.
pub fn export_value(registry: &RuleRegistry, model: &str, field: &str, value: &Value) -> String {
    match registry.get(model, field) {
        Some(rule) if rule.multiple => export_multiple(rule.datatype, value),
        Some(rule) => export_scalar(rule.datatype, value),
        None => heuristic_export(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datacat_rules::Rule;
    use serde_json::json;

    fn registry() -> RuleRegistry {
        let mut flag = Rule::new("dataset", "is_open", Datatype::Boolean);
        flag.translation = false;
        let mut tags = Rule::new("dataset", "tags", Datatype::String);
        tags.multiple = true;
        let mut years = Rule::new("dataset", "years", Datatype::Integer);
        years.multiple = true;
        RuleRegistry::new(vec![
            flag,
            tags,
            years,
            Rule::new("dataset", "count", Datatype::Integer),
            Rule::new("dataset", "updated", Datatype::Date),
            Rule::new("dataset", "meta", Datatype::Object),
            Rule::new("dataset", "link", Datatype::Url),
        ])
        .unwrap()
    }

    #[test]
    fn na_on_boolean_is_absent_not_false() {
        let reg = registry();
        assert_eq!(coerce_import(&reg, "dataset", "is_open", "NA"), Value::Null);
        assert_eq!(coerce_import(&reg, "dataset", "is_open", "True"), json!(true));
        assert_eq!(coerce_import(&reg, "dataset", "is_open", "false"), json!(false));
        assert_eq!(coerce_import(&reg, "dataset", "is_open", ""), json!(""));
    }

    #[test]
    fn pipe_list_round_trips() {
        let reg = registry();
        let v = coerce_import(&reg, "dataset", "tags", "a|b|c");
        assert_eq!(v, json!(["a", "b", "c"]));
        assert_eq!(export_value(&reg, "dataset", "tags", &v), "a|b|c");
    }

    #[test]
    fn multiple_drops_absent_elements_on_export() {
        let reg = registry();
        let v = coerce_import(&reg, "dataset", "years", "2020|NA|2022");
        assert_eq!(v, json!([2020, null, 2022]));
        assert_eq!(export_value(&reg, "dataset", "years", &v), "2020|2022");
        assert_eq!(coerce_import(&reg, "dataset", "years", ""), json!([]));
        assert_eq!(coerce_import(&reg, "dataset", "years", "NULL"), Value::Null);
    }

    #[test]
    fn scalar_round_trip_per_datatype() {
        let reg = registry();
        for (field, raw) in [
            ("is_open", "true"),
            ("count", "42"),
            ("meta", r#"{"k":1}"#),
            ("link", "https://example.org"),
            ("updated", "2021-01-01T00:04:00"),
        ] {
            let v = coerce_import(&reg, "dataset", field, raw);
            let out = export_value(&reg, "dataset", field, &v);
            assert_eq!(coerce_import(&reg, "dataset", field, &out), v, "field {field}");
        }
    }

    #[test]
    fn sentinel_spelled_string_reads_back_as_absent() {
        let reg = registry();
        let stored = json!("NA");
        let out = export_value(&reg, "dataset", "link", &stored);
        assert_eq!(out, "NA");
        assert_eq!(coerce_import(&reg, "dataset", "link", &out), Value::Null);
    }

    #[test]
    fn date_drops_subseconds_and_timezone() {
        assert_eq!(strip_date("2021-01-01T00:04:00.000Z"), "2021-01-01T00:04:00");
        assert_eq!(strip_date("2021-01-01 10:30"), "2021-01-01T10:30:00");
        assert_eq!(strip_date("2021-01-01"), "2021-01-01");
        assert_eq!(strip_date("someday"), "someday");
    }

    #[test]
    fn integer_falls_back_to_text() {
        let reg = registry();
        assert_eq!(coerce_import(&reg, "dataset", "count", "12a"), json!("12a"));
    }

    #[test]
    fn unknown_field_uses_heuristics() {
        let reg = registry();
        assert_eq!(coerce_import(&reg, "dataset", "extra", "True"), json!(true));
        assert_eq!(coerce_import(&reg, "dataset", "extra", "None"), Value::Null);
        assert_eq!(coerce_import(&reg, "dataset", "extra", "x|NA"), json!(["x", null]));
        assert_eq!(coerce_import(&reg, "dataset", "extra", "plain"), json!("plain"));
        assert_eq!(export_value(&reg, "dataset", "extra", &json!(["x", null])), "x");
        assert_eq!(export_value(&reg, "dataset", "extra", &Value::Null), "NA");
    }

    #[test]
    fn absent_and_empty_stay_distinct_on_export() {
        let reg = registry();
        assert_eq!(export_value(&reg, "dataset", "link", &Value::Null), "NA");
        assert_eq!(export_value(&reg, "dataset", "link", &json!("")), "");
    }
}
