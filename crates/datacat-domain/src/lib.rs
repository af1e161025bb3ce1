//! Report types printed by the CLI with `--format json`; their JSON schemas
//! are dumped by `datacat schema`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RulesSummary {
    pub schema_version: u32,
    pub rules: usize,
    pub models: Vec<String>,
    pub reference_tables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceStatus {
    pub table_name: String,
    pub slug: String,
    pub rows: usize,
    pub backfilled: usize,
    pub status: bool,
    pub root_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReferencesSummary {
    pub schema_version: u32,
    pub tables: Vec<ReferenceStatus>,
}

impl ReferencesSummary {
    pub fn failed(&self) -> usize {
        self.tables.iter().filter(|t| !t.status).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportSummary {
    pub schema_version: u32,
    pub model: String,
    pub lang: String,
    /// `replace` or `append`.
    pub mode: String,
    pub rows: usize,
    pub documents: usize,
    pub unknown_columns: Vec<String>,
    pub unresolved: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportSummary {
    pub schema_version: u32,
    pub model: String,
    pub lang: String,
    pub path: String,
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommentSummary {
    pub schema_version: u32,
    pub model: String,
    pub comments: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IndexReport {
    pub index: String,
    pub to_index: usize,
    pub success: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexSummary {
    pub schema_version: u32,
    pub dry_run: bool,
    pub reports: Vec<IndexReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CodegenSummary {
    pub schema_version: u32,
    pub out_dir: String,
    pub models: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InitSummary {
    pub schema_version: u32,
    pub rules: RulesSummary,
    pub references: ReferencesSummary,
    pub imports: Vec<ImportSummary>,
    pub comments: Vec<CommentSummary>,
    pub users: usize,
    pub index: Option<IndexSummary>,
    pub codegen: Option<CodegenSummary>,
}
