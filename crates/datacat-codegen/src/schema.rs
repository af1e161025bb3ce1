use datacat_core::Lang;
use datacat_rules::{Datatype, ReferenceSet, Rule, RuleRegistry};
use serde_json::{json, Map, Value};

use crate::types::type_name;

fn scalar_schema(datatype: Datatype) -> Value {
    match datatype {
        Datatype::String | Datatype::Id => json!({"type": "string"}),
        Datatype::Boolean => json!({"type": "boolean"}),
        Datatype::Date => json!({"type": "string", "format": "date-time"}),
        Datatype::Url => json!({"type": "string", "format": "uri"}),
        Datatype::Email => json!({"type": "string", "format": "email"}),
        Datatype::Object => json!({"type": "object"}),
        Datatype::Integer => json!({"type": "integer"}),
    }
}

fn element_schema(references: &ReferenceSet, rule: &Rule, lang: Option<Lang>) -> Value {
    if rule.is_reference() && rule.is_controled {
        let names = references.names(&rule.reference_table, lang.unwrap_or(Lang::En));
        if !names.is_empty() {
            return json!({"type": "string", "enum": names});
        }
    }
    if rule.is_external() {
        return json!({"type": ["object", "string"]});
    }
    if rule.is_reference() {
        return json!({"type": "string"});
    }
    scalar_schema(rule.datatype)
}

fn field_schema(references: &ReferenceSet, rule: &Rule, lang: Option<Lang>) -> Value {
    let element = element_schema(references, rule, lang);
    let mut schema = if rule.multiple {
        json!({"type": "array", "items": element})
    } else {
        element
    };
    if let Value::Object(obj) = &mut schema {
        let l = lang.unwrap_or(Lang::En);
        obj.insert("title".into(), Value::String(rule.label(l).to_string()));
        let description = rule.description(l);
        if !description.is_empty() {
            obj.insert("description".into(), Value::String(description.to_string()));
        }
    }
    schema
}

/// Schema of one language sub-document (or of the flat document).
pub fn language_schema(
    registry: &RuleRegistry,
    references: &ReferenceSet,
    model: &str,
    lang: Option<Lang>,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for rule in registry.rules_for(model).filter(|r| !r.is_internal()) {
        properties.insert(rule.slug.clone(), field_schema(references, rule, lang));
        if rule.mandatory {
            required.push(Value::String(rule.slug.clone()));
        }
    }
    json!({
        "title": type_name(model, lang),
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// JSON schema of a stored document of `model`; multilingual models nest one
/// schema per language.
pub fn json_schema(registry: &RuleRegistry, references: &ReferenceSet, model: &str) -> Value {
    let mut schema = if registry.is_multilang(model) {
        let mut properties = Map::new();
        properties.insert("id".into(), json!({"type": "string"}));
        for lang in Lang::ALL {
            properties.insert(
                lang.code().to_string(),
                language_schema(registry, references, model, Some(lang)),
            );
        }
        json!({
            "title": type_name(model, None),
            "type": "object",
            "properties": properties,
            "required": Lang::ALL.iter().map(|l| l.code()).collect::<Vec<_>>(),
        })
    } else {
        let mut s = language_schema(registry, references, model, None);
        s["properties"]["id"] = json!({"type": "string"});
        s
    };
    schema["$schema"] = json!("http://json-schema.org/draft-07/schema#");
    schema
}
