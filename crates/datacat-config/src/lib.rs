use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const FILE_NAME: &str = "datacat.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatacatConfig {
    pub data_dir: Option<String>,
    pub store_path: Option<String>,
    pub default_lang: Option<String>,
    /// Import order of the models in `init`.
    pub models: Option<Vec<String>>,
    pub import: Option<ImportCfg>,
    pub export: Option<ExportCfg>,
    pub translate: Option<TranslateCfg>,
    pub search: Option<SearchCfg>,
    pub codegen: Option<CodegenCfg>,
    pub schema: Option<SchemaCfg>,
    pub users: Option<Vec<UserCfg>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportCfg {
    pub keep_unknown: Option<bool>,
    pub append: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportCfg {
    pub out_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateCfg {
    pub provider: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: Option<u64>,
    pub cache_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCfg {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodegenCfg {
    pub out_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaCfg {
    pub out_dir: Option<String>,
}

/// A catalog account seeded into the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCfg {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "yes")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "fr")]
    pub lang: String,
}

fn yes() -> bool {
    true
}

fn fr() -> String {
    "fr".to_string()
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Candidate files, highest priority first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(p) = std::env::current_dir() {
        out.push(p.join(FILE_NAME));
    }
    if let Some(base) = dirs::config_dir() {
        out.push(base.join("datacat").join(FILE_NAME));
    }
    out
}

pub fn load_config() -> Result<DatacatConfig, ConfigError> {
    load_from(&search_paths())
}

/// Merge every existing file of `paths`; earlier files win field by field.
pub fn load_from(paths: &[PathBuf]) -> Result<DatacatConfig, ConfigError> {
    let mut merged = DatacatConfig::default();
    for path in paths {
        if let Some(cfg) = read_one(path)? {
            tracing::debug!(event = "config_loaded", path = %path.display());
            merged = merge(merged, cfg);
        }
    }
    Ok(merged)
}

fn read_one(path: &Path) -> Result<Option<DatacatConfig>, ConfigError> {
    let Ok(s) = std::fs::read_to_string(path) else {
        return Ok(None);
    };
    toml::from_str::<DatacatConfig>(&s)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
}

fn merge(mut a: DatacatConfig, b: DatacatConfig) -> DatacatConfig {
    if a.data_dir.is_none() {
        a.data_dir = b.data_dir;
    }
    if a.store_path.is_none() {
        a.store_path = b.store_path;
    }
    if a.default_lang.is_none() {
        a.default_lang = b.default_lang;
    }
    if a.models.is_none() {
        a.models = b.models;
    }
    if a.users.is_none() {
        a.users = b.users;
    }
    a.import = merge_opt(a.import, b.import, merge_import);
    a.export = merge_opt(a.export, b.export, merge_export);
    a.translate = merge_opt(a.translate, b.translate, merge_translate);
    a.search = merge_opt(a.search, b.search, merge_search);
    a.codegen = merge_opt(a.codegen, b.codegen, merge_codegen);
    a.schema = merge_opt(a.schema, b.schema, merge_schema);
    a
}

fn merge_opt<T: Default>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (None, Some(b)) => Some(b),
        (Some(a), None) => Some(a),
        (None, None) => None,
    }
}

fn merge_import(mut a: ImportCfg, b: ImportCfg) -> ImportCfg {
    if a.keep_unknown.is_none() {
        a.keep_unknown = b.keep_unknown;
    }
    if a.append.is_none() {
        a.append = b.append;
    }
    a
}
fn merge_export(mut a: ExportCfg, b: ExportCfg) -> ExportCfg {
    if a.out_dir.is_none() {
        a.out_dir = b.out_dir;
    }
    a
}
fn merge_translate(mut a: TranslateCfg, b: TranslateCfg) -> TranslateCfg {
    if a.provider.is_none() {
        a.provider = b.provider;
    }
    if a.url.is_none() {
        a.url = b.url;
    }
    if a.api_key.is_none() {
        a.api_key = b.api_key;
    }
    if a.timeout_ms.is_none() {
        a.timeout_ms = b.timeout_ms;
    }
    if a.cache_size.is_none() {
        a.cache_size = b.cache_size;
    }
    a
}
fn merge_search(mut a: SearchCfg, b: SearchCfg) -> SearchCfg {
    if a.url.is_none() {
        a.url = b.url;
    }
    if a.timeout_secs.is_none() {
        a.timeout_secs = b.timeout_secs;
    }
    a
}
fn merge_codegen(mut a: CodegenCfg, b: CodegenCfg) -> CodegenCfg {
    if a.out_dir.is_none() {
        a.out_dir = b.out_dir;
    }
    a
}
fn merge_schema(mut a: SchemaCfg, b: SchemaCfg) -> SchemaCfg {
    if a.out_dir.is_none() {
        a.out_dir = b.out_dir;
    }
    a
}
