use std::fs;
use std::path::PathBuf;

use super::Context;
use crate::ui_ok;

pub fn run_schema(ctx: &Context, out_dir: PathBuf) -> color_eyre::Result<()> {
    let out_dir = if out_dir.as_os_str().is_empty() {
        PathBuf::from(
            ctx.config
                .schema
                .as_ref()
                .and_then(|s| s.out_dir.clone())
                .unwrap_or_else(|| "./docs/assets/schemas".to_string()),
        )
    } else {
        out_dir
    };
    fs::create_dir_all(&out_dir)?;
    macro_rules! dump {
        ($ty:ty, $name:literal) => {{
            let schema = schemars::schema_for!($ty);
            let path = out_dir.join($name);
            let f = std::fs::File::create(&path)?;
            serde_json::to_writer_pretty(f, &schema)?;
        }};
    }
    dump!(datacat_domain::RulesSummary, "rules_summary.schema.json");
    dump!(datacat_domain::ReferencesSummary, "references_summary.schema.json");
    dump!(datacat_domain::ImportSummary, "import_summary.schema.json");
    dump!(datacat_domain::ExportSummary, "export_summary.schema.json");
    dump!(datacat_domain::CommentSummary, "comment_summary.schema.json");
    dump!(datacat_domain::IndexSummary, "index_summary.schema.json");
    dump!(datacat_domain::CodegenSummary, "codegen_summary.schema.json");
    dump!(datacat_domain::InitSummary, "init_summary.schema.json");
    ui_ok!("schemas written to {}", out_dir.display());
    Ok(())
}
