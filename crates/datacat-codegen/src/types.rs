//! Names and Rust types of the generated items.

use datacat_core::{title_case, Lang};
use datacat_rules::{reference_slug, Datatype, Rule, RuleRegistry};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while",
];

/// Field identifier, raw when the slug is a keyword.
pub fn field_ident(slug: &str) -> String {
    if KEYWORDS.contains(&slug) {
        format!("r#{slug}")
    } else {
        slug.to_string()
    }
}

/// `dataset` + `fr` -> `DatasetFr`.
pub fn type_name(model: &str, lang: Option<Lang>) -> String {
    match lang {
        Some(l) => format!("{}{}", title_case(model), l.title()),
        None => title_case(model),
    }
}

pub fn filter_name(model: &str, lang: Option<Lang>) -> String {
    format!("Filter{}", type_name(model, lang))
}

/// Enum of a controlled vocabulary; monolingual callers get the English one.
pub fn reference_type_name(table: &str, lang: Option<Lang>) -> String {
    type_name(reference_slug(table), Some(lang.unwrap_or(Lang::En)))
}

pub fn scalar_type(datatype: Datatype) -> &'static str {
    match datatype {
        Datatype::String | Datatype::Id | Datatype::Url | Datatype::Email => "String",
        Datatype::Boolean => "bool",
        Datatype::Date => "chrono::NaiveDateTime",
        Datatype::Object => "serde_json::Value",
        Datatype::Integer => "i64",
    }
}

/// Type of one element of the field, before `Vec`/`Option` wrapping.
pub fn element_type(registry: &RuleRegistry, rule: &Rule, lang: Option<Lang>) -> String {
    if rule.is_reference() {
        if rule.is_controled {
            reference_type_name(&rule.reference_table, lang)
        } else {
            "String".to_string()
        }
    } else if rule.is_external() {
        let ext = &rule.external_model;
        if registry.is_multilang(ext) {
            type_name(ext, Some(lang.unwrap_or(Lang::En)))
        } else {
            type_name(ext, None)
        }
    } else {
        scalar_type(rule.datatype).to_string()
    }
}

/// Declared type of the field in the model struct.
pub fn declared_type(registry: &RuleRegistry, rule: &Rule, lang: Option<Lang>) -> String {
    let mut ty = element_type(registry, rule, lang);
    if rule.multiple {
        ty = format!("Vec<{ty}>");
    } else if rule.is_external() && rule.external_model == rule.model {
        ty = format!("Box<{ty}>");
    }
    if rule.mandatory {
        ty
    } else {
        format!("Option<{ty}>")
    }
}

/// Declared type in the filter struct: every criterion is optional.
pub fn filter_type(registry: &RuleRegistry, rule: &Rule, lang: Option<Lang>) -> String {
    let ty = element_type(registry, rule, lang);
    if rule.multiple {
        format!("Option<Vec<{ty}>>")
    } else if rule.is_external() && rule.external_model == rule.model {
        format!("Option<Box<{ty}>>")
    } else {
        format!("Option<{ty}>")
    }
}
