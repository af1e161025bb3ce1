use std::path::Path;

use datacat_codegen::{plan_app, write_app};
use datacat_core::Result;
use datacat_domain::{CodegenSummary, SCHEMA_VERSION};

use crate::{logs, Catalog};

/// Generate the API sources for the catalog's current rules under `out_dir`.
pub fn generate_app(catalog: &Catalog, out_dir: &Path) -> Result<CodegenSummary> {
    let files = plan_app(&catalog.registry, &catalog.references)?;
    let written = write_app(out_dir, &files)?;
    let models: Vec<String> = catalog.registry.models().into_iter().map(str::to_string).collect();
    tracing::info!(event = "codegen_done", out_dir = %out_dir.display(), files = written.len());
    logs::record(&catalog.store, "generate", "api", true, &format!("{} files", written.len()))?;
    Ok(CodegenSummary {
        schema_version: SCHEMA_VERSION,
        out_dir: out_dir.display().to_string(),
        models,
        files: files.iter().map(|f| f.path.display().to_string()).collect(),
    })
}
