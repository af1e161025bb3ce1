use std::path::Path;

use color_eyre::eyre::bail;
use datacat_coerce::{coerce_import, dereference, heuristic_import};
use datacat_core::{is_internal_slug, Document, Lang, Result};
use datacat_csv::read_table_path;
use datacat_domain::{ImportSummary, SCHEMA_VERSION};
use datacat_rules::Rule;
use datacat_store::model_collection;
use datacat_translate::{translate_doc, Translator};
use serde_json::Value;

use crate::catalog::StoreLookup;
use crate::{logs, Catalog};

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Keep columns no rule describes, typed heuristically.
    pub keep_unknown: bool,
    /// Add to the collection instead of replacing it.
    pub append: bool,
}

enum Column<'a> {
    Known(&'a Rule),
    Unknown(&'a str),
    Skipped,
}

/// Display values of an external field that did not resolve to a document.
fn unresolved(rule: &Rule, value: &Value) -> usize {
    if !rule.is_external() {
        return 0;
    }
    match value {
        Value::String(s) if !s.is_empty() => 1,
        Value::Array(items) => items
            .iter()
            .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
            .count(),
        _ => 0,
    }
}

/// Import `path`, a CSV whose header holds `lang` labels (or slugs), into the
/// collection of `model`. Multilingual models get the other language through
/// the translation backfill.
pub fn import_model(
    catalog: &Catalog,
    translator: &mut dyn Translator,
    model: &str,
    lang: Lang,
    path: &Path,
    opts: ImportOptions,
) -> Result<ImportSummary> {
    let registry = &catalog.registry;
    if !registry.has_model(model) {
        bail!("no rules for model '{model}'");
    }
    let table = read_table_path(path)?;
    tracing::debug!(event = "import_args", model, lang = %lang, path = %path.display(), rows = table.rows.len());

    let mut unknown_columns = Vec::new();
    let columns: Vec<Column> = table
        .headers
        .iter()
        .map(|header| match registry.rule_for_header(model, lang, header) {
            Some(rule) if rule.is_internal() || rule.is_excluded() => Column::Skipped,
            Some(rule) => Column::Known(rule),
            None if is_internal_slug(header.trim()) || header.trim().is_empty() => Column::Skipped,
            None => {
                unknown_columns.push(header.clone());
                if opts.keep_unknown {
                    Column::Unknown(header.trim())
                } else {
                    Column::Skipped
                }
            }
        })
        .collect();
    if !unknown_columns.is_empty() {
        tracing::warn!(
            event = "unknown_columns",
            model,
            kept = opts.keep_unknown,
            columns = ?unknown_columns
        );
    }

    let lookup = StoreLookup::new(&catalog.store);
    let multilang = registry.is_multilang(model);
    let mut docs = Vec::with_capacity(table.rows.len());
    let mut unresolved_total = 0usize;
    for row in &table.rows {
        let mut doc = Document::new();
        for (column, cell) in columns.iter().zip(row) {
            match column {
                Column::Known(rule) => {
                    let value = coerce_import(registry, model, &rule.slug, cell);
                    let value = dereference(registry, rule, value, lang, &lookup);
                    unresolved_total += unresolved(rule, &value);
                    doc.insert(rule.slug.clone(), value);
                }
                Column::Unknown(name) => {
                    doc.insert(name.to_string(), heuristic_import(cell));
                }
                Column::Skipped => {}
            }
        }
        if multilang {
            let other = translate_doc(registry, &catalog.references, translator, model, &doc, lang)?;
            let mut twin = Document::new();
            for l in Lang::ALL {
                let sub = if l == lang { doc.clone() } else { other.clone() };
                twin.insert(l.code().to_string(), Value::Object(sub));
            }
            docs.push(twin);
        } else {
            docs.push(doc);
        }
    }

    let collection = model_collection(model);
    let documents = docs.len();
    if opts.append {
        for doc in &docs {
            catalog.store.insert(&collection, doc)?;
        }
    } else {
        catalog.store.bulk_replace(&collection, docs)?;
    }
    tracing::info!(event = "model_imported", model, lang = %lang, documents, unresolved = unresolved_total);
    logs::record(&catalog.store, "import", model, true, &format!("{documents} documents"))?;
    Ok(ImportSummary {
        schema_version: SCHEMA_VERSION,
        model: model.to_string(),
        lang: lang.code().to_string(),
        mode: if opts.append { "append" } else { "replace" }.to_string(),
        rows: table.rows.len(),
        documents,
        unknown_columns,
        unresolved: unresolved_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::references::import_references;
    use crate::test_support::{catalog_with_fixtures, fixtures};
    use datacat_translate::IdentityTranslator;
    use serde_json::json;

    fn loaded() -> (tempfile::TempDir, Catalog, std::path::PathBuf) {
        let dir = fixtures();
        let (mut catalog, data) = catalog_with_fixtures(&dir);
        import_references(&mut catalog, &mut IdentityTranslator, &data.join("references")).unwrap();
        (dir, catalog, data)
    }

    #[test]
    fn multilingual_rows_get_twin_documents() {
        let (_dir, catalog, data) = loaded();
        let opts = ImportOptions::default();
        let orgs = data.join("organizations/organizations_fr.csv");
        import_model(&catalog, &mut IdentityTranslator, "organization", Lang::Fr, &orgs, opts).unwrap();
        let datasets = data.join("datasets/datasets_fr.csv");
        let summary =
            import_model(&catalog, &mut IdentityTranslator, "dataset", Lang::Fr, &datasets, opts).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.unknown_columns, vec!["Colonne inconnue".to_string()]);
        assert_eq!(summary.unresolved, 1);

        let records = catalog.records("dataset").unwrap();
        let first = &records[0].doc;
        assert_eq!(first["fr"]["theme"], json!(["Air", "Eau"]));
        assert_eq!(first["en"]["theme"], json!(["Air", "Water"]));
        assert_eq!(first["fr"]["is_open"], json!(true));
        assert_eq!(first["fr"]["year"], json!(2021));
        assert_eq!(first["fr"]["organizations"][0]["fr"]["name"], json!("Ministère"));
        assert!(first["fr"]["organizations"][0]["id"].is_string());
        assert!(first["fr"].get("Colonne inconnue").is_none());
        assert!(first["fr"].get("internal_note").is_none());

        let second = &records[1].doc;
        assert!(second["fr"]["is_open"].is_null());
        assert_eq!(second["fr"]["organizations"][1], json!("Inconnue"));
    }

    #[test]
    fn keep_unknown_and_append() {
        let (_dir, catalog, data) = loaded();
        let datasets = data.join("datasets/datasets_fr.csv");
        let opts = ImportOptions {
            keep_unknown: true,
            append: false,
        };
        import_model(&catalog, &mut IdentityTranslator, "dataset", Lang::Fr, &datasets, opts).unwrap();
        let records = catalog.records("dataset").unwrap();
        assert_eq!(records[0].doc["fr"]["Colonne inconnue"], json!("x"));

        let opts = ImportOptions {
            keep_unknown: false,
            append: true,
        };
        let summary =
            import_model(&catalog, &mut IdentityTranslator, "dataset", Lang::Fr, &datasets, opts).unwrap();
        assert_eq!(summary.mode, "append");
        assert_eq!(catalog.records("dataset").unwrap().len(), 4);
    }

    #[test]
    fn monolingual_model_is_stored_flat() {
        let (_dir, catalog, data) = loaded();
        let users = data.join("users.csv");
        std::fs::write(&users, "Courriel,Actif\nadmin@example.org,yes\n").unwrap();
        import_model(&catalog, &mut IdentityTranslator, "user", Lang::Fr, &users, ImportOptions::default())
            .unwrap();
        let records = catalog.records("user").unwrap();
        assert_eq!(records[0].doc["email"], json!("admin@example.org"));
        assert_eq!(records[0].doc["is_active"], json!(true));
        assert!(records[0].doc.get("fr").is_none());
    }

    #[test]
    fn unknown_model_is_rejected() {
        let (_dir, catalog, data) = loaded();
        let err = import_model(
            &catalog,
            &mut IdentityTranslator,
            "nothing",
            Lang::Fr,
            &data.join("datasets/datasets_fr.csv"),
            ImportOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("nothing"));
    }
}
