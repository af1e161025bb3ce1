use std::path::Path;

use color_eyre::eyre::bail;
use datacat_coerce::coerce_export;
use datacat_core::{Lang, Result};
use datacat_csv::{write_table_path, Table};
use datacat_domain::{ExportSummary, SCHEMA_VERSION};

use crate::{logs, Catalog};

/// Write every document of `model` to `path` with headers and values in `lang`.
pub fn export_model(catalog: &Catalog, model: &str, lang: Lang, path: &Path) -> Result<ExportSummary> {
    let registry = &catalog.registry;
    if !registry.has_model(model) {
        bail!("no rules for model '{model}'");
    }
    let columns: Vec<_> = registry.csv_columns(model).collect();
    let mut table = Table::new(columns.iter().map(|r| r.label(lang).to_string()).collect());
    let records = catalog.records(model)?;
    tracing::debug!(event = "export_args", model, lang = %lang, path = %path.display(), documents = records.len());

    for record in &records {
        // A document without this language still gets its row, all cells empty.
        let Some(doc) = catalog.view(model, &record.doc, lang) else {
            tracing::warn!(event = "missing_language", model, id = %record.id, lang = %lang);
            table.rows.push(vec![String::new(); columns.len()]);
            continue;
        };
        let row = columns
            .iter()
            .map(|rule| match doc.get(&rule.slug) {
                Some(value) => coerce_export(registry, model, &rule.slug, value, lang),
                None => String::new(),
            })
            .collect();
        table.rows.push(row);
    }

    write_table_path(path, &table)?;
    let rows = table.rows.len();
    tracing::info!(event = "model_exported", model, lang = %lang, rows, path = %path.display());
    logs::record(&catalog.store, "export", model, true, &format!("{rows} rows"))?;
    Ok(ExportSummary {
        schema_version: SCHEMA_VERSION,
        model: model.to_string(),
        lang: lang.code().to_string(),
        path: path.display().to_string(),
        columns: table.headers.len(),
        rows,
    })
}
