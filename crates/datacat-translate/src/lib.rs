//! Backfill of the missing language of documents and reference rows.

pub mod translator;

use datacat_core::{Document, Lang, Result};
use datacat_rules::{FieldPolicy, RefEntry, ReferenceSet, Rule, RuleRegistry};
use serde_json::Value;

pub use translator::{
    build_translator, IdentityTranslator, Provider, RestTranslator, TranslateOptions, Translator,
};

fn machine(translator: &mut dyn Translator, value: &Value, from: Lang) -> Result<Value> {
    match value {
        Value::String(s) if !s.is_empty() => {
            Ok(Value::String(translator.translate(s, from, from.other())?))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| machine(translator, v, from))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn controlled(references: &ReferenceSet, rule: &Rule, value: &Value, from: Lang) -> Value {
    match value {
        Value::String(s) => match references.translated_name(&rule.reference_table, s, from) {
            Some(name) => Value::String(name.to_string()),
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| controlled(references, rule, v, from))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Build the `from.other()` sub-document of `model` from the `from` one.
///
/// Fields without a rule, or whose rule is not translatable, are copied
/// verbatim. Controlled terms go through their reference table and are never
/// sent to the translator.
pub fn translate_doc(
    registry: &RuleRegistry,
    references: &ReferenceSet,
    translator: &mut dyn Translator,
    model: &str,
    doc: &Document,
    from: Lang,
) -> Result<Document> {
    let mut out = Document::new();
    for (field, value) in doc {
        let translated = match registry.get(model, field) {
            None => value.clone(),
            Some(rule) => match rule.policy() {
                FieldPolicy::Passthrough => value.clone(),
                FieldPolicy::Machine => machine(translator, value, from)?,
                FieldPolicy::Reference => controlled(references, rule, value, from),
            },
        };
        out.insert(field.clone(), translated);
    }
    Ok(out)
}

/// Fill the missing name of a reference row. Returns `false` when the row
/// carries no name at all and was left untouched.
pub fn backfill_entry(translator: &mut dyn Translator, entry: &mut RefEntry) -> Result<bool> {
    if entry.has_no_name() {
        tracing::warn!(event = "reference_row_without_name", uri = %entry.uri);
        return Ok(false);
    }
    if let Some(to) = entry.missing_lang() {
        let from = to.other();
        let name = translator.translate(entry.name(from), from, to)?;
        entry.set_name(to, name);
    }
    Ok(true)
}
