use std::path::PathBuf;

use super::{require_rules, Context};
use crate::{ui, ui_ok};

pub fn codegen_dir(ctx: &Context, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| {
        PathBuf::from(
            ctx.config
                .codegen
                .as_ref()
                .and_then(|c| c.out_dir.clone())
                .unwrap_or_else(|| "api".to_string()),
        )
    })
}

pub fn run_codegen(ctx: &Context, out_dir: Option<PathBuf>) -> color_eyre::Result<()> {
    let out_dir = codegen_dir(ctx, out_dir);
    tracing::debug!(event = "codegen_args", out_dir = %out_dir.display());

    let catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let summary = datacat_services::generate_app(&catalog, &out_dir)?;

    if ctx.json() {
        return ui::print_json(&summary);
    }
    ui_ok!(
        "{} files for {} models generated in {}",
        summary.files.len(),
        summary.models.len(),
        summary.out_dir
    );
    Ok(())
}
