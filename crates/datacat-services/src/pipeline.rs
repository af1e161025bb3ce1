//! `init`: rebuild the whole catalog from a data directory.
//!
//! Layout of the data directory:
//!
//! ```text
//! rules.csv
//! references/<table>.csv
//! <model>s/<model>s_<lang>.csv   (or <model>s/<model>s.csv)
//! ```

use std::path::{Path, PathBuf};

use datacat_config::UserCfg;
use datacat_core::{Lang, Result};
use datacat_domain::{InitSummary, SCHEMA_VERSION};
use datacat_index::SearchBackend;
use datacat_rules::RuleRegistry;
use datacat_store::model_collection;
use datacat_translate::Translator;

use crate::codegen::generate_app;
use crate::comments::register_comments;
use crate::import::{import_model, ImportOptions};
use crate::index::index_all;
use crate::references::import_references;
use crate::rules::import_rules;
use crate::users::seed_users;
use crate::Catalog;

pub struct InitOptions<'a> {
    pub data_dir: PathBuf,
    /// Models to import; every model of the rules when empty. Models are
    /// reordered so that external models come before the models embedding them.
    pub models: Vec<String>,
    pub lang: Lang,
    pub import: ImportOptions,
    pub users: Vec<UserCfg>,
    /// Rebuild the search indices with this backend.
    pub index: Option<&'a mut dyn SearchBackend>,
    pub dry_run: bool,
    /// Generate the API sources into this directory.
    pub codegen_out: Option<PathBuf>,
}

impl InitOptions<'_> {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            models: Vec::new(),
            lang: Lang::Fr,
            import: ImportOptions::default(),
            users: Vec::new(),
            index: None,
            dry_run: false,
            codegen_out: None,
        }
    }
}

/// Source CSV of `model` in `lang`, if present.
pub fn model_source(data_dir: &Path, model: &str, lang: Lang) -> Option<PathBuf> {
    let collection = model_collection(model);
    let dir = data_dir.join(&collection);
    [
        dir.join(format!("{collection}_{}.csv", lang.code())),
        dir.join(format!("{collection}.csv")),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

/// `models` reordered so that each model follows the external models it
/// embeds. Ties keep the given order; a cycle falls back to it.
fn import_order(registry: &RuleRegistry, models: &[String]) -> Vec<String> {
    let mut pending: Vec<(String, Vec<String>)> = models
        .iter()
        .map(|model| {
            let deps = registry
                .rules_for(model)
                .filter(|r| r.is_external() && r.external_model != *model)
                .filter(|r| models.contains(&r.external_model))
                .map(|r| r.external_model.clone())
                .collect();
            (model.clone(), deps)
        })
        .collect();
    let mut ordered: Vec<String> = Vec::with_capacity(models.len());
    while !pending.is_empty() {
        let next = pending
            .iter()
            .position(|(_, deps)| deps.iter().all(|d| ordered.contains(d)))
            .unwrap_or(0);
        ordered.push(pending.remove(next).0);
    }
    ordered
}

pub fn init(catalog: &mut Catalog, translator: &mut dyn Translator, opts: InitOptions<'_>) -> Result<InitSummary> {
    tracing::info!(event = "init_started", data_dir = %opts.data_dir.display());
    let rules = import_rules(catalog, &opts.data_dir.join("rules.csv"))?;
    let references = import_references(catalog, translator, &opts.data_dir.join("references"))?;

    let requested = if opts.models.is_empty() {
        &rules.models
    } else {
        &opts.models
    };
    let models = import_order(&catalog.registry, requested);
    tracing::debug!(event = "import_order", models = ?models);
    let mut imports = Vec::new();
    for model in &models {
        let Some(path) = model_source(&opts.data_dir, model, opts.lang) else {
            tracing::warn!(event = "model_source_missing", model = %model, lang = %opts.lang);
            continue;
        };
        imports.push(import_model(catalog, translator, model, opts.lang, &path, opts.import)?);
    }

    let mut comments = Vec::new();
    for summary in &imports {
        let has_comments = catalog
            .registry
            .rules_for(&summary.model)
            .any(|r| r.slug.contains("comment"));
        if has_comments {
            comments.push(register_comments(catalog, &summary.model)?);
        }
    }

    let users = seed_users(catalog, &opts.users)?;

    let index = match opts.index {
        Some(backend) => Some(index_all(catalog, backend, &[], opts.dry_run)?),
        None => None,
    };
    let codegen = match &opts.codegen_out {
        Some(out) => Some(generate_app(catalog, out)?),
        None => None,
    };
    catalog.store.flush()?;
    tracing::info!(event = "init_done", models = imports.len(), users);

    Ok(InitSummary {
        schema_version: SCHEMA_VERSION,
        rules,
        references,
        imports,
        comments,
        users,
        index,
        codegen,
    })
}
