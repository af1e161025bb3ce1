use std::path::PathBuf;

use datacat_core::Lang;
use datacat_services::{ImportOptions, InitOptions};

use super::codegen::codegen_dir;
use super::Context;
use crate::{ui, ui_ok, ui_out, ui_warn};

pub fn run_init(
    ctx: &Context,
    data_dir: Option<PathBuf>,
    lang: Option<Lang>,
    index: bool,
    dry_run: bool,
    codegen: bool,
) -> color_eyre::Result<()> {
    let data_dir = data_dir.unwrap_or_else(|| ctx.data_dir());
    let lang = ctx.lang(lang)?;
    tracing::debug!(event = "init_args", data_dir = %data_dir.display(), lang = %lang, index = index, dry_run = dry_run, codegen = codegen);

    let search = ctx.config.search.clone().unwrap_or_default();
    let mut backend = if index {
        Some(datacat_services::build_backend(search.url.as_deref(), search.timeout_secs, dry_run)?)
    } else {
        None
    };
    let import = ctx.config.import.clone().unwrap_or_default();

    let mut opts = InitOptions::new(&data_dir);
    opts.models = ctx.config.models.clone().unwrap_or_default();
    opts.lang = lang;
    opts.import = ImportOptions {
        keep_unknown: import.keep_unknown.unwrap_or(false),
        append: import.append.unwrap_or(false),
    };
    opts.users = ctx.config.users.clone().unwrap_or_default();
    if let Some(b) = backend.as_mut() {
        opts.index = Some(b.as_mut());
    }
    opts.dry_run = dry_run;
    opts.codegen_out = codegen.then(|| codegen_dir(ctx, None));

    let mut catalog = ctx.open_catalog()?;
    let mut translator = ctx.translator()?;
    let summary = datacat_services::init(&mut catalog, translator.as_mut(), opts)?;

    if ctx.json() {
        return ui::print_json(&summary);
    }
    ui_out!("rules: {}", summary.rules.rules);
    for table in &summary.references.tables {
        if !table.status {
            ui_warn!("reference table {} is missing", table.table_name);
        }
    }
    for imported in &summary.imports {
        ui_out!("{}: {} documents", imported.model, imported.documents);
    }
    let comments: usize = summary.comments.iter().map(|c| c.comments).sum();
    ui_out!("comments: {comments}");
    ui_out!("users: {}", summary.users);
    if let Some(index) = &summary.index {
        ui_out!("indices: {}", index.reports.len());
    }
    if let Some(codegen) = &summary.codegen {
        ui_out!("generated files: {} in {}", codegen.files.len(), codegen.out_dir);
    }
    ui_ok!("catalog initialised from {}", data_dir.display());
    Ok(())
}
