use std::path::{Path, PathBuf};

use color_eyre::eyre::bail;
use datacat_core::{Lang, Result};
use datacat_csv::{write_table_path, Table};
use datacat_rules::RuleRegistry;

/// `template-dataset_fr.csv` for multilingual models, `template-user.csv` otherwise.
pub fn template_file_name(registry: &RuleRegistry, model: &str, lang: Lang) -> String {
    if registry.is_multilang(model) {
        format!("template-{model}_{}.csv", lang.code())
    } else {
        format!("template-{model}.csv")
    }
}

/// Write a header-only import template for `model` into `out_dir`.
pub fn build_import_template(registry: &RuleRegistry, model: &str, lang: Lang, out_dir: &Path) -> Result<PathBuf> {
    if !registry.has_model(model) {
        bail!("no rules for model '{model}'");
    }
    let headers = registry
        .csv_columns(model)
        .map(|r| r.label(lang).to_string())
        .collect();
    let path = out_dir.join(template_file_name(registry, model, lang));
    write_table_path(&path, &Table::new(headers))?;
    tracing::info!(event = "template_written", model, path = %path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RULES_CSV;

    #[test]
    fn template_has_labels_only() {
        let registry = RuleRegistry::from_csv_reader(RULES_CSV.as_bytes()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = build_import_template(&registry, "dataset", Lang::Fr, dir.path()).unwrap();
        assert!(path.ends_with("template-dataset_fr.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Titre,Thème,Organisations"));
        assert!(!text.contains("Note interne"));

        let user = build_import_template(&registry, "user", Lang::En, dir.path()).unwrap();
        assert!(user.ends_with("template-user.csv"));
    }
}
