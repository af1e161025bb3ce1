use std::path::Path;

use datacat_core::Result;
use datacat_csv::{read_table_path, write_table_path, Table};
use datacat_domain::{ReferenceStatus, ReferencesSummary, SCHEMA_VERSION};
use datacat_rules::{reference_slug, RefEntry, Reference, ReferenceSet};
use datacat_store::REFERENCES;
use datacat_translate::{backfill_entry, Translator};

use crate::{logs, Catalog};

/// `ref_theme` and `theme` both live in `ref_theme`.
pub fn reference_collection(table: &str) -> String {
    format!("ref_{}", reference_slug(table))
}

/// `http://ex.org/theme/air` -> `http://ex.org/theme`.
fn root_of(uri: &str) -> Option<String> {
    let trimmed = uri.trim_end_matches('/');
    let (root, last) = trimmed.rsplit_once('/')?;
    if last.is_empty() || root.ends_with('/') {
        return None;
    }
    Some(root.to_string())
}

fn root_uri(entries: &[RefEntry]) -> Option<String> {
    let explicit = entries
        .iter()
        .filter_map(|e| e.extra.get("root_uri"))
        .find(|v| !v.is_empty());
    if let Some(v) = explicit {
        return Some(v.clone());
    }
    entries
        .iter()
        .rev()
        .map(|e| e.uri.as_str())
        .find(|u| !u.is_empty())
        .and_then(root_of)
}

fn to_table(entries: &[RefEntry]) -> Table {
    let mut headers: Vec<String> = Vec::new();
    for entry in entries {
        for (k, _) in entry.columns() {
            if !headers.contains(&k) {
                headers.push(k);
            }
        }
    }
    let mut table = Table::new(headers);
    for entry in entries {
        let cols = entry.columns();
        let row = table
            .headers
            .iter()
            .map(|h| {
                cols.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect();
        table.rows.push(row);
    }
    table
}

/// Load one reference table from `path`, backfilling missing names.
/// Returns the reference and the number of backfilled rows.
pub fn load_reference(
    translator: &mut dyn Translator,
    table_name: &str,
    path: &Path,
) -> Result<(Reference, usize)> {
    let mut reference = Reference::new(table_name);
    let table = read_table_path(path)?;
    let mut backfilled = 0usize;
    // Raw rows already read; duplicates compare before backfill changes them.
    let mut seen: Vec<RefEntry> = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut entry = RefEntry::from_pairs(table.pairs(row));
        if seen.contains(&entry) || reference.refs.contains(&entry) {
            tracing::debug!(event = "reference_duplicate_skipped", table = table_name, name_fr = %entry.name_fr);
            continue;
        }
        seen.push(entry.clone());
        let was_missing = entry.missing_lang().is_some();
        if backfill_entry(translator, &mut entry)? && was_missing {
            backfilled += 1;
        }
        if reference.refs.contains(&entry) {
            tracing::debug!(event = "reference_duplicate_skipped", table = table_name, name_fr = %entry.name_fr);
            continue;
        }
        reference.refs.push(entry);
    }
    reference.root_uri = root_uri(&reference.refs);
    reference.status = true;
    Ok((reference, backfilled))
}

/// Rebuild every reference table named by the rules from `<dir>/<table>.csv`.
///
/// A missing file yields a failed entry and the other tables are still loaded.
/// Back-filled names are written back to the source file.
pub fn import_references(
    catalog: &mut Catalog,
    translator: &mut dyn Translator,
    dir: &Path,
) -> Result<ReferencesSummary> {
    let tables: Vec<String> = catalog
        .registry
        .reference_tables()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut references = Vec::with_capacity(tables.len());
    let mut statuses = Vec::with_capacity(tables.len());
    for table_name in &tables {
        let path = dir.join(format!("{table_name}.csv"));
        let (reference, backfilled) = if path.is_file() {
            let (reference, backfilled) = load_reference(translator, table_name, &path)?;
            if backfilled > 0 {
                write_table_path(&path, &to_table(&reference.refs))?;
            }
            catalog
                .store
                .bulk_replace_values(&reference_collection(table_name), &reference.refs)?;
            (reference, backfilled)
        } else {
            tracing::warn!(event = "reference_file_missing", table = %table_name, path = %path.display());
            (Reference::new(table_name), 0)
        };
        logs::record(
            &catalog.store,
            "import",
            "reference",
            reference.status,
            &format!("{table_name}: {} rows", reference.refs.len()),
        )?;
        statuses.push(ReferenceStatus {
            table_name: table_name.clone(),
            slug: reference.slug.clone(),
            rows: reference.refs.len(),
            backfilled,
            status: reference.status,
            root_uri: reference.root_uri.clone(),
        });
        references.push(reference);
    }
    catalog.store.bulk_replace_values(REFERENCES, &references)?;
    catalog.references = references.into_iter().collect::<ReferenceSet>();
    let summary = ReferencesSummary {
        schema_version: SCHEMA_VERSION,
        tables: statuses,
    };
    tracing::info!(event = "references_imported", tables = summary.tables.len(), failed = summary.failed());
    Ok(summary)
}
