use datacat_core::{Document, Lang};
use datacat_rules::RuleRegistry;
use datacat_store::Record;
use serde_json::Value;

/// `{id, ...doc[lang]}` for an embedded external document; flat documents keep their fields.
fn flatten_embedded(value: &Value, lang: Option<Lang>) -> Value {
    let Value::Object(doc) = value else {
        return value.clone();
    };
    let mut out = Document::new();
    if let Some(id) = doc.get("id") {
        out.insert("id".into(), id.clone());
    }
    let scope = lang.and_then(|l| doc.get(l.code())).and_then(Value::as_object);
    let fields = scope.unwrap_or(doc);
    for (k, v) in fields {
        if k != "id" && !(scope.is_none() && Lang::ALL.iter().any(|l| l.code() == k)) {
            out.insert(k.clone(), v.clone());
        }
    }
    Value::Object(out)
}

/// Search record of `record`: the `lang` sub-document (or the flat document)
/// restricted to searchable fields, with the store identifier injected as `id`.
pub fn flatten_document(
    registry: &RuleRegistry,
    model: &str,
    record: &Record,
    lang: Option<Lang>,
) -> Document {
    let source = match lang {
        Some(l) => record.doc.get(l.code()).and_then(Value::as_object),
        None => Some(&record.doc),
    };
    let mut out = Document::new();
    out.insert("id".into(), Value::String(record.id.clone()));
    let Some(source) = source else {
        return out;
    };
    for rule in registry.searchable_fields(model) {
        let Some(value) = source.get(&rule.slug) else {
            continue;
        };
        let value = if rule.is_external() {
            match value {
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .filter(|v| !v.is_null())
                        .map(|v| flatten_embedded(v, lang))
                        .collect(),
                ),
                other => flatten_embedded(other, lang),
            }
        } else {
            value.clone()
        };
        out.insert(rule.slug.clone(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use datacat_rules::{Datatype, Rule};
    use serde_json::json;

    fn registry() -> RuleRegistry {
        let mut title = Rule::new("dataset", "title", Datatype::String);
        title.is_indexed = true;
        title.translation = true;
        let mut orgs = Rule::new("dataset", "organizations", Datatype::Object);
        orgs.is_facet = true;
        orgs.multiple = true;
        orgs.external_model = "organization".into();
        RuleRegistry::new(vec![title, orgs, Rule::new("dataset", "note", Datatype::String)]).unwrap()
    }

    #[test]
    fn language_sub_document_becomes_top_level() {
        let record = Record {
            id: "00000000000000a1".into(),
            doc: json!({
                "fr": {
                    "title": "Eau",
                    "note": "interne",
                    "organizations": [
                        {"id": "o1", "fr": {"name": "Ministère"}, "en": {"name": "Ministry"}},
                        null
                    ]
                },
                "en": {"title": "Water"}
            })
            .as_object()
            .cloned()
            .unwrap(),
        };
        let flat = flatten_document(&registry(), "dataset", &record, Some(Lang::Fr));
        assert_eq!(
            Value::Object(flat),
            json!({
                "id": "00000000000000a1",
                "title": "Eau",
                "organizations": [{"id": "o1", "name": "Ministère"}]
            })
        );
        let en = flatten_document(&registry(), "dataset", &record, Some(Lang::En));
        assert_eq!(en["title"], json!("Water"));
        assert!(en.get("organizations").is_none());
    }

    #[test]
    fn missing_language_yields_bare_id() {
        let record = Record {
            id: "x".into(),
            doc: json!({"fr": {"title": "Eau"}}).as_object().cloned().unwrap(),
        };
        let flat = flatten_document(&registry(), "dataset", &record, Some(Lang::En));
        assert_eq!(Value::Object(flat), json!({"id": "x"}));
    }
}
