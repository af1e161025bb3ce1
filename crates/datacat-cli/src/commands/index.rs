use super::{require_rules, Context};
use crate::{ui, ui_ok, ui_out, ui_warn};

pub fn run_index(ctx: &Context, models: Vec<String>, url: Option<String>, dry_run: bool) -> color_eyre::Result<()> {
    let search = ctx.config.search.clone().unwrap_or_default();
    let url = url.or(search.url);
    tracing::debug!(event = "index_args", models = ?models, url = ?url, dry_run = dry_run);

    let catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let mut backend = datacat_services::build_backend(url.as_deref(), search.timeout_secs, dry_run)?;
    let summary = datacat_services::index_all(&catalog, backend.as_mut(), &models, dry_run)?;

    if ctx.json() {
        return ui::print_json(&summary);
    }
    for report in &summary.reports {
        if report.errors > 0 {
            ui_warn!(
                "{}: {}/{} documents indexed, {} errors",
                report.index,
                report.success,
                report.to_index,
                report.errors
            );
        } else {
            ui_out!("{}: {}/{} documents indexed", report.index, report.success, report.to_index);
        }
    }
    let mode = if dry_run { " (dry run)" } else { "" };
    ui_ok!("{} indices rebuilt{mode}", summary.reports.len());
    Ok(())
}
