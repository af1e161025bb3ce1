//! Search indexing: one index per (model, language), built from the rules'
//! indexed and facet flags.

pub mod backend;
pub mod flatten;
pub mod mapping;

use datacat_core::Lang;
use datacat_domain::IndexReport;
use datacat_rules::RuleRegistry;
use datacat_store::Record;
use serde_json::Value;
use thiserror::Error;

pub use backend::{DryRunBackend, ElasticBackend, SearchBackend, DEFAULT_TIMEOUT_SECS};
pub use flatten::flatten_document;
pub use mapping::{create_mapping, index_body, index_settings};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("search engine request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search engine answered {status} for '{index}': {body}")]
    Status {
        index: String,
        status: u16,
        body: String,
    },
    #[error("document '{id}' rejected by '{index}'")]
    Rejected { index: String, id: String },
}

/// `dataset` + `fr` -> `dataset_fr`; monolingual models use the bare model name.
pub fn index_name(model: &str, lang: Option<Lang>) -> String {
    match lang {
        Some(l) => format!("{model}_{l}"),
        None => model.to_string(),
    }
}

/// Recreate the index of `model` in `lang` and load `records` into it.
///
/// A document the engine refuses is counted in `errors` and the loop goes on;
/// only failing to create the index aborts.
pub fn index_model<B: SearchBackend + ?Sized>(
    backend: &mut B,
    registry: &RuleRegistry,
    model: &str,
    lang: Option<Lang>,
    records: &[Record],
) -> Result<IndexReport, IndexError> {
    let index = index_name(model, lang);
    backend.recreate_index(&index, &index_body(registry, model, lang))?;
    let mut report = IndexReport {
        index: index.clone(),
        to_index: records.len(),
        ..Default::default()
    };
    for record in records {
        let doc = Value::Object(flatten_document(registry, model, record, lang));
        match backend.index_doc(&index, &record.id, &doc) {
            Ok(()) => report.success += 1,
            Err(e) => {
                tracing::warn!(event = "index_doc_failed", index = %index, id = %record.id, error = %e);
                report.errors += 1;
            }
        }
    }
    tracing::info!(
        event = "index_done",
        index = %index,
        to_index = report.to_index,
        success = report.success,
        errors = report.errors
    );
    Ok(report)
}
