//! Display values for fields that point to another model.

use datacat_core::{Document, Lang};
use datacat_rules::{Datatype, Rule, RuleRegistry};
use serde_json::Value;

use crate::coerce::{export_scalar, heuristic_export, join, EXPORT_NULL};

/// Read access to the documents of other models, used on import to turn a
/// display value back into an embedded document.
pub trait ExternalDocuments {
    fn find_by_id(&self, model: &str, id: &str) -> Option<Document>;

    /// Document whose `key` equals `value`, read from the `lang` sub-document
    /// when the model is multilingual.
    fn find_by_display(
        &self,
        model: &str,
        lang: Option<Lang>,
        key: &str,
        value: &str,
    ) -> Option<Document>;
}

/// How the display key of an external model is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Display<'a> {
    Id,
    Localized(&'a str, Datatype),
    Flat(&'a str, Datatype),
}

fn display_of<'a>(registry: &'a RuleRegistry, rule: &'a Rule) -> Option<Display<'a>> {
    let key = rule.display_key()?;
    let ext = &rule.external_model;
    let datatype = registry
        .get(ext, key)
        .map(|r| r.datatype)
        .unwrap_or(Datatype::String);
    Some(if datatype == Datatype::Id {
        Display::Id
    } else if registry.is_multilang(ext) {
        Display::Localized(key, datatype)
    } else {
        Display::Flat(key, datatype)
    })
}

fn resolve_one(display: Display<'_>, value: &Value, lang: Lang) -> String {
    let Value::Object(doc) = value else {
        // A plain id or unresolved text.
        return heuristic_export(value);
    };
    match display {
        Display::Id => doc.get("id").map(heuristic_export).unwrap_or_default(),
        Display::Localized(key, datatype) => match doc.get(lang.code()).and_then(|d| d.get(key)) {
            Some(v) => export_scalar(datatype, v),
            None => String::new(),
        },
        Display::Flat(key, datatype) => match doc.get(key) {
            Some(v) => export_scalar(datatype, v),
            None => String::new(),
        },
    }
}

/// CSV text for an external-model field in `lang`.
///
/// Returns `None` when the rule does not point to another model or declares no
/// display key, so the caller falls back to plain coercion.
pub fn display_value(registry: &RuleRegistry, rule: &Rule, value: &Value, lang: Lang) -> Option<String> {
    if !rule.is_external() {
        return None;
    }
    let display = display_of(registry, rule)?;
    let out = match value {
        Value::Null => EXPORT_NULL.to_string(),
        Value::Array(items) if rule.multiple => join(
            items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| resolve_one(display, v, lang)),
        ),
        other => resolve_one(display, other, lang),
    };
    Some(out)
}

fn with_id(id: &str, doc: Document) -> Value {
    let mut out = Document::new();
    out.insert("id".into(), Value::String(id.to_string()));
    for (k, v) in doc {
        if k != "id" {
            out.insert(k, v);
        }
    }
    Value::Object(out)
}

fn lookup<D: ExternalDocuments + ?Sized>(
    docs: &D,
    rule: &Rule,
    display: Display<'_>,
    text: &str,
    lang: Lang,
) -> Value {
    let ext = &rule.external_model;
    let found = match display {
        Display::Id => docs.find_by_id(ext, text),
        Display::Localized(key, _) => docs.find_by_display(ext, Some(lang), key, text),
        Display::Flat(key, _) => docs.find_by_display(ext, None, key, text),
    };
    match found {
        Some(doc) => {
            let id = doc
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| text.to_string());
            with_id(&id, doc)
        }
        None => {
            tracing::warn!(
                event = "unresolved_reference",
                model = %rule.model,
                field = %rule.slug,
                external_model = %ext,
                value = text
            );
            Value::String(text.to_string())
        }
    }
}

/// Import direction: swap display values of an external-model field for the
/// documents they name. Values that are not text, and text that matches no
/// document, are returned unchanged.
pub fn dereference<D: ExternalDocuments + ?Sized>(
    registry: &RuleRegistry,
    rule: &Rule,
    value: Value,
    lang: Lang,
    docs: &D,
) -> Value {
    if !rule.is_external() {
        return value;
    }
    let Some(display) = display_of(registry, rule) else {
        return value;
    };
    match value {
        Value::String(s) if !s.is_empty() => lookup(docs, rule, display, &s, lang),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) if !s.is_empty() => lookup(docs, rule, display, &s, lang),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    /// In-memory documents keyed by model.
    #[derive(Default)]
    struct Docs(HashMap<String, Vec<Document>>);

    impl Docs {
        fn with(mut self, model: &str, doc: Value) -> Self {
            self.0
                .entry(model.to_string())
                .or_default()
                .push(doc.as_object().cloned().unwrap());
            self
        }
    }

    impl ExternalDocuments for Docs {
        fn find_by_id(&self, model: &str, id: &str) -> Option<Document> {
            self.0
                .get(model)?
                .iter()
                .find(|d| d.get("id").and_then(Value::as_str) == Some(id))
                .cloned()
        }

        fn find_by_display(&self, model: &str, lang: Option<Lang>, key: &str, value: &str) -> Option<Document> {
            self.0
                .get(model)?
                .iter()
                .find(|d| {
                    let scope = match lang {
                        Some(l) => d.get(l.code()),
                        None => None,
                    };
                    let field = match scope {
                        Some(s) => s.get(key),
                        None => d.get(key),
                    };
                    field.and_then(Value::as_str) == Some(value)
                })
                .cloned()
        }
    }

    fn registry() -> RuleRegistry {
        let mut orgs = Rule::new("dataset", "organizations", Datatype::Object);
        orgs.multiple = true;
        orgs.external_model = "organization".into();
        orgs.external_model_display_keys = vec!["name".into(), "id".into()];

        let mut owner = Rule::new("dataset", "owner", Datatype::Object);
        owner.external_model = "user".into();
        owner.external_model_display_keys = vec!["email".into()];

        let mut parent = Rule::new("dataset", "parent", Datatype::Object);
        parent.external_model = "dataset".into();
        parent.external_model_display_keys = vec!["id".into()];

        let mut name = Rule::new("organization", "name", Datatype::String);
        name.translation = true;

        RuleRegistry::new(vec![
            orgs,
            owner,
            parent,
            Rule::new("dataset", "id", Datatype::Id),
            name,
            Rule::new("user", "email", Datatype::Email),
        ])
        .unwrap()
    }

    fn ministry() -> Value {
        json!({"id": "org1", "fr": {"name": "Ministère"}, "en": {"name": "Ministry"}})
    }

    #[test]
    fn multilingual_display_key_exports_in_requested_language() {
        let reg = registry();
        let rule = reg.get("dataset", "organizations").unwrap();
        let value = json!([ministry()]);
        assert_eq!(display_value(&reg, rule, &value, Lang::Fr).as_deref(), Some("Ministère"));
        assert_eq!(display_value(&reg, rule, &value, Lang::En).as_deref(), Some("Ministry"));
    }

    #[test]
    fn each_element_is_resolved_independently() {
        let reg = registry();
        let rule = reg.get("dataset", "organizations").unwrap();
        let other = json!({"id": "org2", "fr": {"name": "Agence"}, "en": {"name": "Agency"}});
        let value = json!([ministry(), null, other]);
        assert_eq!(display_value(&reg, rule, &value, Lang::Fr).as_deref(), Some("Ministère|Agence"));
    }

    #[test]
    fn id_display_key_passes_identifier_through() {
        let reg = registry();
        let rule = reg.get("dataset", "parent").unwrap();
        let value = json!({"id": "ds9", "fr": {"title": "x"}});
        assert_eq!(display_value(&reg, rule, &value, Lang::Fr).as_deref(), Some("ds9"));
        assert_eq!(display_value(&reg, rule, &json!("ds9"), Lang::Fr).as_deref(), Some("ds9"));
    }

    #[test]
    fn monolingual_external_reads_flat_key() {
        let reg = registry();
        let rule = reg.get("dataset", "owner").unwrap();
        let value = json!({"id": "u1", "email": "a@b.org"});
        assert_eq!(display_value(&reg, rule, &value, Lang::En).as_deref(), Some("a@b.org"));
        assert_eq!(display_value(&reg, rule, &Value::Null, Lang::En).as_deref(), Some("NA"));
    }

    #[test]
    fn non_external_fields_are_left_to_coercion() {
        let reg = registry();
        let rule = reg.get("organization", "name").unwrap();
        assert!(display_value(&reg, rule, &json!("x"), Lang::Fr).is_none());
    }

    #[test]
    fn dereference_embeds_found_document() {
        let reg = registry();
        let docs = Docs::default().with("organization", ministry());
        let rule = reg.get("dataset", "organizations").unwrap();
        let out = dereference(&reg, rule, json!(["Ministère", "Inconnu"]), Lang::Fr, &docs);
        assert_eq!(out, json!([ministry(), "Inconnu"]));
        assert_eq!(display_value(&reg, rule, &out, Lang::Fr).as_deref(), Some("Ministère|Inconnu"));
    }

    #[test]
    fn dereference_by_id_and_flat_key() {
        let reg = registry();
        let docs = Docs::default()
            .with("dataset", json!({"id": "ds9", "fr": {}}))
            .with("user", json!({"id": "u1", "email": "a@b.org"}));
        let parent = reg.get("dataset", "parent").unwrap();
        assert_eq!(
            dereference(&reg, parent, json!("ds9"), Lang::Fr, &docs)["id"],
            json!("ds9")
        );
        let owner = reg.get("dataset", "owner").unwrap();
        assert_eq!(
            dereference(&reg, owner, json!("a@b.org"), Lang::En, &docs),
            json!({"id": "u1", "email": "a@b.org"})
        );
        assert_eq!(dereference(&reg, owner, Value::Null, Lang::En, &docs), Value::Null);
    }
}
