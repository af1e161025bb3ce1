use color_eyre::eyre::{bail, WrapErr};
use datacat_core::Result;
use datacat_domain::{IndexSummary, SCHEMA_VERSION};
use datacat_index::{index_model, DryRunBackend, ElasticBackend, SearchBackend, DEFAULT_TIMEOUT_SECS};

use crate::{logs, Catalog};

/// Search engine selected from the command line and `[search]`.
pub fn build_backend(url: Option<&str>, timeout_secs: Option<u64>, dry_run: bool) -> Result<Box<dyn SearchBackend>> {
    if dry_run {
        return Ok(Box::new(DryRunBackend::new()));
    }
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        bail!("no search engine url: set [search] url or pass --dry-run");
    };
    let backend = ElasticBackend::new(url, timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
        .wrap_err_with(|| format!("cannot build search client for {url}"))?;
    Ok(Box::new(backend))
}

/// Rebuild the indices of `models`, or of every model with indexed or facet
/// fields when `models` is empty.
pub fn index_all(
    catalog: &Catalog,
    backend: &mut dyn SearchBackend,
    models: &[String],
    dry_run: bool,
) -> Result<IndexSummary> {
    let registry = &catalog.registry;
    let targets: Vec<String> = if models.is_empty() {
        registry
            .models()
            .into_iter()
            .filter(|m| registry.is_search_model(m))
            .map(str::to_string)
            .collect()
    } else {
        models.to_vec()
    };

    let mut reports = Vec::new();
    for model in &targets {
        if !registry.is_search_model(model) {
            tracing::warn!(event = "model_not_searchable", model = %model);
            continue;
        }
        let records = catalog.records(model)?;
        for lang in registry.langs(model) {
            let report = index_model(&mut *backend, registry, model, lang, &records)?;
            logs::record(
                &catalog.store,
                "index",
                model,
                report.errors == 0,
                &format!("{}: {}/{} documents", report.index, report.success, report.to_index),
            )?;
            reports.push(report);
        }
    }
    Ok(IndexSummary {
        schema_version: SCHEMA_VERSION,
        dry_run,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{import_model, ImportOptions};
    use crate::references::import_references;
    use crate::test_support::{catalog_with_fixtures, fixtures};
    use datacat_core::Lang;
    use datacat_translate::IdentityTranslator;
    use serde_json::json;

    #[test]
    fn dry_run_indexes_every_language() {
        let dir = fixtures();
        let (mut catalog, data) = catalog_with_fixtures(&dir);
        let mut t = IdentityTranslator;
        import_references(&mut catalog, &mut t, &data.join("references")).unwrap();
        let opts = ImportOptions::default();
        let orgs = data.join("organizations/organizations_fr.csv");
        import_model(&catalog, &mut t, "organization", Lang::Fr, &orgs, opts).unwrap();
        let datasets = data.join("datasets/datasets_fr.csv");
        import_model(&catalog, &mut t, "dataset", Lang::Fr, &datasets, opts).unwrap();

        let mut backend = DryRunBackend::new();
        let summary = index_all(&catalog, &mut backend, &[], true).unwrap();
        let names: Vec<&str> = summary.reports.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(names, vec!["organization_fr", "organization_en", "dataset_fr", "dataset_en"]);
        assert!(summary.reports.iter().all(|r| r.errors == 0));

        let first = &backend.documents["dataset_en"][0].1;
        assert_eq!(first["theme"], json!(["Air", "Water"]));
        assert!(first.get("comment_quality").is_none());
        assert_eq!(backend.indices["dataset_fr"]["mappings"]["properties"]["id"]["type"], json!("keyword"));
    }

    #[test]
    fn live_backend_needs_a_url() {
        assert!(build_backend(None, None, false).is_err());
        assert!(build_backend(None, None, true).is_ok());
    }
}
