use std::path::PathBuf;

use super::Context;
use crate::{ui, ui_ok, ui_out};

pub fn run_rules(ctx: &Context, file: Option<PathBuf>, check: bool) -> color_eyre::Result<()> {
    let path = file.unwrap_or_else(|| ctx.data_dir().join("rules.csv"));
    tracing::debug!(event = "rules_args", path = %path.display(), check = check);

    let summary = if check {
        datacat_services::summarize(&datacat_services::load_rules(&path)?)
    } else {
        let mut catalog = ctx.open_catalog()?;
        let summary = datacat_services::import_rules(&mut catalog, &path)?;
        catalog.store.flush()?;
        summary
    };

    if ctx.json() {
        return ui::print_json(&summary);
    }
    if check {
        ui_ok!("{} rules are valid", summary.rules);
    } else {
        ui_ok!("{} rules loaded from {}", summary.rules, path.display());
    }
    ui_out!("models: {}", summary.models.join(", "));
    if !summary.reference_tables.is_empty() {
        ui_out!("reference tables: {}", summary.reference_tables.join(", "));
    }
    Ok(())
}
