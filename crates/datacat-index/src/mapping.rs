use datacat_core::Lang;
use datacat_rules::{Datatype, Rule, RuleRegistry};
use serde_json::{json, Map, Value};

pub const FRENCH_ANALYZER: &str = "std_french";
pub const ENGLISH_ANALYZER: &str = "std_english";

/// Monolingual models are analysed as English.
pub fn analyzer(lang: Option<Lang>) -> &'static str {
    match lang {
        Some(Lang::Fr) => FRENCH_ANALYZER,
        _ => ENGLISH_ANALYZER,
    }
}

fn text(analyzer: &str) -> Value {
    json!({
        "type": "text",
        "analyzer": analyzer,
        "fields": {"raw": {"type": "keyword"}}
    })
}

fn property(rule: &Rule, analyzer: &str) -> Value {
    let range = rule.constraint == "range";
    if rule.is_reference() {
        return text(analyzer);
    }
    if rule.is_external() {
        return json!({"type": "nested"});
    }
    match rule.datatype {
        Datatype::Object => json!({"type": "object", "enabled": false}),
        Datatype::Id => json!({"type": "keyword"}),
        Datatype::String | Datatype::Url | Datatype::Email => text(analyzer),
        Datatype::Date if range => json!({"type": "date_range"}),
        Datatype::Date => json!({"type": "date", "format": "strict_date_optional_time_nanos"}),
        Datatype::Boolean => json!({"type": "boolean"}),
        Datatype::Integer if range => json!({"type": "integer_range"}),
        Datatype::Integer => json!({"type": "integer"}),
    }
}

/// `properties` of the index of `model` in `lang`, built from its indexed and facet fields.
pub fn create_mapping(registry: &RuleRegistry, model: &str, lang: Option<Lang>) -> Value {
    let analyzer = analyzer(lang);
    let mut props = Map::new();
    props.insert("id".into(), json!({"type": "keyword"}));
    for rule in registry.searchable_fields(model) {
        props.insert(rule.slug.clone(), property(rule, analyzer));
    }
    Value::Object(props)
}

pub fn index_settings() -> Value {
    json!({
        "number_of_shards": 1,
        "number_of_replicas": 0,
        "analysis": {
            "filter": {
                "french_elision": {
                    "type": "elision",
                    "articles_case": true,
                    "articles": ["l", "m", "t", "qu", "n", "s", "j", "d", "c", "jusqu", "quoiqu", "lorsqu", "puisqu"]
                },
                "french_stop": {"type": "stop", "stopwords": "_french_"}
            },
            "analyzer": {
                ENGLISH_ANALYZER: {"type": "standard", "stopwords": "_english_"},
                FRENCH_ANALYZER: {
                    "type": "custom",
                    "tokenizer": "standard",
                    "filter": ["french_elision", "lowercase", "asciifolding", "french_stop"]
                }
            }
        }
    })
}

/// Request body of the index creation call.
pub fn index_body(registry: &RuleRegistry, model: &str, lang: Option<Lang>) -> Value {
    json!({
        "settings": index_settings(),
        "mappings": {"properties": create_mapping(registry, model, lang)}
    })
}
