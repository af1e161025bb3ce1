pub mod admin;
pub mod codegen;
pub mod export;
pub mod import;
pub mod index;
pub mod init;
pub mod references;
pub mod rules;
pub mod schema;
pub mod template;

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use datacat_config::DatacatConfig;
use datacat_core::Lang;
use datacat_services::Catalog;
use datacat_store::Store;
use datacat_translate::{build_translator, Provider, TranslateOptions, Translator};

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Settings shared by every command: configuration files merged with the
/// global flags.
pub struct Context {
    pub config: DatacatConfig,
    store: Option<PathBuf>,
    pub format: Format,
}

impl Context {
    pub fn load(config: Option<&Path>, store: Option<PathBuf>, format: Format) -> Result<Self> {
        let config = match config {
            Some(path) => {
                if !path.is_file() {
                    color_eyre::eyre::bail!("config file not found: {}", path.display());
                }
                datacat_config::load_from(&[path.to_path_buf()])?
            }
            None => datacat_config::load_config()?,
        };
        Ok(Self { config, store, format })
    }

    pub fn json(&self) -> bool {
        self.format == Format::Json
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .or_else(|| self.config.store_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("datacat.db"))
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(self.config.data_dir.as_deref().unwrap_or("data"))
    }

    /// The `--lang` flag, then `default_lang`, then French.
    pub fn lang(&self, flag: Option<Lang>) -> Result<Lang> {
        if let Some(lang) = flag {
            return Ok(lang);
        }
        match self.config.default_lang.as_deref() {
            Some(code) => Ok(code.parse::<Lang>()?),
            None => Ok(Lang::Fr),
        }
    }

    pub fn open_catalog(&self) -> Result<Catalog> {
        let path = self.store_path();
        let store = Store::open(&path).wrap_err_with(|| format!("cannot open store {}", path.display()))?;
        Catalog::open(store)
    }

    pub fn translator(&self) -> Result<Box<dyn Translator>> {
        let mut opts = TranslateOptions::default();
        if let Some(t) = &self.config.translate {
            if let Some(p) = t.provider.as_deref() {
                opts.provider = p.parse::<Provider>()?;
            }
            opts.url = t.url.clone();
            opts.api_key = t.api_key.clone();
            if let Some(ms) = t.timeout_ms {
                opts.timeout_ms = ms;
            }
            if let Some(n) = t.cache_size {
                opts.cache_size = n;
            }
        }
        build_translator(&opts)
    }
}

/// Fails with a readable message when the store holds no rules yet.
pub fn require_rules(catalog: &Catalog) -> Result<()> {
    if catalog.registry.is_empty() {
        color_eyre::eyre::bail!("the store has no rules; run `datacat rules` first");
    }
    Ok(())
}
