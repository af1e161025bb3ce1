use std::collections::BTreeMap;

use super::{require_rules, Context};
use crate::{ui, ui_ok, ui_out};

pub fn run_comments(ctx: &Context, model: String) -> color_eyre::Result<()> {
    tracing::debug!(event = "comments_args", model = %model);
    let catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let summary = datacat_services::register_comments(&catalog, &model)?;
    catalog.store.flush()?;
    if ctx.json() {
        return ui::print_json(&summary);
    }
    ui_ok!("{} comments registered for {}", summary.comments, summary.model);
    Ok(())
}

pub fn run_users(ctx: &Context) -> color_eyre::Result<()> {
    let users = ctx.config.users.clone().unwrap_or_default();
    let catalog = ctx.open_catalog()?;
    let count = datacat_services::seed_users(&catalog, &users)?;
    catalog.store.flush()?;
    if ctx.json() {
        return ui::print_json(&serde_json::json!({ "users": count }));
    }
    ui_ok!("{count} users written");
    Ok(())
}

pub fn run_collections(ctx: &Context) -> color_eyre::Result<()> {
    let catalog = ctx.open_catalog()?;
    let mut sizes = BTreeMap::new();
    for name in catalog.store.collections()? {
        let n = catalog.store.count(&name)?;
        sizes.insert(name, n);
    }
    if ctx.json() {
        return ui::print_json(&sizes);
    }
    for (name, n) in &sizes {
        ui_out!("{name}\t{n}");
    }
    Ok(())
}
