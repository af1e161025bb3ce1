use std::path::PathBuf;

use color_eyre::eyre::eyre;
use datacat_core::Lang;
use datacat_services::ImportOptions;

use super::{require_rules, Context};
use crate::{ui, ui_ok, ui_warn};

pub fn run_import(
    ctx: &Context,
    model: String,
    lang: Option<Lang>,
    file: Option<PathBuf>,
    keep_unknown: bool,
    append: bool,
) -> color_eyre::Result<()> {
    let lang = ctx.lang(lang)?;
    let cfg = ctx.config.import.clone().unwrap_or_default();
    let opts = ImportOptions {
        keep_unknown: keep_unknown || cfg.keep_unknown.unwrap_or(false),
        append: append || cfg.append.unwrap_or(false),
    };
    tracing::debug!(event = "import_cmd_args", model = %model, lang = %lang, file = ?file, keep_unknown = opts.keep_unknown, append = opts.append);

    let data_dir = ctx.data_dir();
    let path = match file {
        Some(p) => p,
        None => datacat_services::model_source(&data_dir, &model, lang)
            .ok_or_else(|| eyre!("no CSV for '{model}' in {}; pass --file", data_dir.display()))?,
    };

    let catalog = ctx.open_catalog()?;
    require_rules(&catalog)?;
    let mut translator = ctx.translator()?;
    let summary = datacat_services::import_model(&catalog, translator.as_mut(), &model, lang, &path, opts)?;
    catalog.store.flush()?;

    if ctx.json() {
        return ui::print_json(&summary);
    }
    if !summary.unknown_columns.is_empty() {
        let fate = if opts.keep_unknown { "kept" } else { "ignored" };
        ui_warn!("unknown columns {}: {}", fate, summary.unknown_columns.join(", "));
    }
    if summary.unresolved > 0 {
        ui_warn!("{} values did not match any linked document", summary.unresolved);
    }
    ui_ok!(
        "{} {} documents imported from {} ({})",
        summary.documents,
        summary.model,
        path.display(),
        summary.mode
    );
    Ok(())
}
