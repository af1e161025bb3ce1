use std::path::PathBuf;

use datacat_core::Lang;

use super::{require_rules, Context};
use crate::{ui, ui_ok};

pub fn run_export(ctx: &Context, model: String, lang: Option<Lang>, out: Option<PathBuf>) -> color_eyre::Result<()> {
    let lang = ctx.lang(lang)?;
    let out = out.unwrap_or_else(|| {
        let dir = ctx
            .config
            .export
            .as_ref()
            .and_then(|e| e.out_dir.clone())
            .unwrap_or_else(|| "export".to_string());
        PathBuf::from(dir).join(format!("{model}s_{}.csv", lang.code()))
    });
    tracing::debug!(event = "export_cmd_args", model = %model, lang = %lang, out = %out.display());

    let catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let summary = datacat_services::export_model(&catalog, &model, lang, &out)?;

    if ctx.json() {
        return ui::print_json(&summary);
    }
    ui_ok!("{} rows of {} written to {}", summary.rows, summary.model, summary.path);
    Ok(())
}
