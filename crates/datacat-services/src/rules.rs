use std::path::Path;

use color_eyre::eyre::WrapErr;
use datacat_core::Result;
use datacat_domain::{RulesSummary, SCHEMA_VERSION};
use datacat_rules::RuleRegistry;
use datacat_store::RULES;

use crate::{logs, Catalog};

/// Parse and validate `rules.csv` without touching the store.
pub fn load_rules(path: &Path) -> Result<RuleRegistry> {
    RuleRegistry::from_csv_path(path).wrap_err_with(|| format!("cannot load rules from {}", path.display()))
}

pub fn summarize(registry: &RuleRegistry) -> RulesSummary {
    RulesSummary {
        schema_version: SCHEMA_VERSION,
        rules: registry.len(),
        models: registry.models().into_iter().map(str::to_string).collect(),
        reference_tables: registry
            .reference_tables()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Replace the `rules` collection with the content of `path` and make it the
/// catalog's registry.
pub fn import_rules(catalog: &mut Catalog, path: &Path) -> Result<RulesSummary> {
    let registry = load_rules(path)?;
    catalog.store.bulk_replace_values(RULES, registry.rules())?;
    let summary = summarize(&registry);
    tracing::info!(event = "rules_imported", rules = summary.rules, models = summary.models.len());
    catalog.registry = registry;
    logs::record(&catalog.store, "import", "rule", true, &format!("{} rules", summary.rules))?;
    Ok(summary)
}
