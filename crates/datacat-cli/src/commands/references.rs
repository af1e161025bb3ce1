use std::path::PathBuf;

use super::{require_rules, Context};
use crate::{ui, ui_ok, ui_out, ui_warn};

pub fn run_references(ctx: &Context, dir: Option<PathBuf>) -> color_eyre::Result<()> {
    let dir = dir.unwrap_or_else(|| ctx.data_dir().join("references"));
    tracing::debug!(event = "references_args", dir = %dir.display());

    let mut catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let mut translator = ctx.translator()?;
    let summary = datacat_services::import_references(&mut catalog, translator.as_mut(), &dir)?;
    catalog.store.flush()?;

    if ctx.json() {
        return ui::print_json(&summary);
    }
    for table in &summary.tables {
        if table.status {
            ui_out!(
                "{}: {} rows ({} back-filled)",
                table.table_name,
                table.rows,
                table.backfilled
            );
        } else {
            ui_warn!("{}: no file in {}", table.table_name, dir.display());
        }
    }
    ui_ok!(
        "{} reference tables loaded, {} failed",
        summary.tables.len() - summary.failed(),
        summary.failed()
    );
    Ok(())
}
