//! Schema-driven conversion of field values between CSV text and documents.

pub mod coerce;
pub mod resolve;

use datacat_core::Lang;
use datacat_rules::RuleRegistry;
use serde_json::Value;

pub use coerce::{
    coerce_import, export_multiple, export_scalar, export_value, heuristic_export,
    heuristic_import, import_multiple, import_scalar, is_null_sentinel, strip_date, EXPORT_NULL,
    MULTI_SEPARATOR, NULL_SENTINELS,
};
pub use resolve::{dereference, display_value, ExternalDocuments};

/// CSV text for `model.field` in `lang`: external-model fields are resolved to
/// their display value, everything else goes through plain coercion.
pub fn coerce_export(
    registry: &RuleRegistry,
    model: &str,
    field: &str,
    value: &Value,
    lang: Lang,
) -> String {
    registry
        .get(model, field)
        .and_then(|rule| display_value(registry, rule, value, lang))
        .unwrap_or_else(|| export_value(registry, model, field, value))
}
