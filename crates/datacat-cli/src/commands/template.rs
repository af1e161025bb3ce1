use std::path::PathBuf;

use datacat_core::Lang;

use super::{require_rules, Context};
use crate::{ui, ui_ok};

pub fn run_template(ctx: &Context, model: String, lang: Option<Lang>, out_dir: Option<PathBuf>) -> color_eyre::Result<()> {
    let lang = ctx.lang(lang)?;
    let out_dir = out_dir.unwrap_or_else(|| {
        PathBuf::from(
            ctx.config
                .export
                .as_ref()
                .and_then(|e| e.out_dir.clone())
                .unwrap_or_else(|| ".".to_string()),
        )
    });
    tracing::debug!(event = "template_args", model = %model, lang = %lang, out_dir = %out_dir.display());

    let catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let path = datacat_services::build_import_template(&catalog.registry, &model, lang, &out_dir)?;

    if ctx.json() {
        return ui::print_json(&serde_json::json!({ "model": model, "path": path.display().to_string() }));
    }
    ui_ok!("template written to {}", path.display());
    Ok(())
}
