//! Generation of a typed axum application from the rule registry.

pub mod render;
pub mod schema;
pub mod types;

use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use datacat_core::Result;
use datacat_rules::{ReferenceSet, RuleRegistry};

pub use render::ModelPlan;
pub use schema::json_schema;

/// One file of the generated tree, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// Every file of the application, in a stable order.
pub fn plan_app(registry: &RuleRegistry, references: &ReferenceSet) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    let mut modules = Vec::new();
    let mut routers = Vec::new();

    let has_controlled = registry
        .rules()
        .iter()
        .any(|r| r.is_reference() && r.is_controled);
    if has_controlled {
        files.push(GeneratedFile::new("reference/mod.rs", render::render_mod(false)));
        files.push(GeneratedFile::new(
            "reference/models.rs",
            render::render_reference_models(registry, references)?,
        ));
        modules.push("reference".to_string());
    }

    for model in registry.models() {
        let plan = ModelPlan::from_registry(registry, model);
        let schema = serde_json::to_string_pretty(&json_schema(registry, references, model))?;
        files.push(GeneratedFile::new(format!("{model}/schema.json"), schema));
        files.push(GeneratedFile::new(format!("{model}/mod.rs"), render::render_mod(true)));
        files.push(GeneratedFile::new(
            format!("{model}/models.rs"),
            render::render_models(registry, model)?,
        ));
        files.push(GeneratedFile::new(
            format!("{model}/routes.rs"),
            render::render_routes(&plan, None)?,
        ));
        files.push(GeneratedFile::new(
            format!("{model}/services.rs"),
            render::render_services(registry, &plan)?,
        ));
        modules.push(model.to_string());
        routers.push(model.to_string());
    }

    if !registry.has_model("rule") {
        let plan = ModelPlan::rules();
        files.push(GeneratedFile::new("rule/mod.rs", render::render_mod(true)));
        files.push(GeneratedFile::new("rule/models.rs", render::render_rule_models()?));
        files.push(GeneratedFile::new("rule/routes.rs", render::render_routes(&plan, Some("Rule"))?));
        files.push(GeneratedFile::new(
            "rule/services.rs",
            render::render_services(registry, &plan)?,
        ));
        modules.push("rule".to_string());
        routers.push("rule".to_string());
    }

    files.push(GeneratedFile::new("main.rs", render::render_main(&modules, &routers)?));
    Ok(files)
}

/// Write `files` under `out_dir`, replacing existing files. Returns the written paths.
pub fn write_app(out_dir: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("cannot create {}", parent.display()))?;
        }
        std::fs::write(&path, &file.contents)
            .wrap_err_with(|| format!("cannot write {}", path.display()))?;
        tracing::debug!(event = "codegen_file", path = %path.display());
        written.push(path);
    }
    Ok(written)
}
