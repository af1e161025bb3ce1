use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use color_eyre::eyre::eyre;
use datacat_core::{Lang, Result};
use lru::LruCache;

/// Machine translation of a single piece of text.
pub trait Translator {
    fn translate(&mut self, text: &str, from: Lang, to: Lang) -> Result<String>;
}

/// Offline translator: returns the text unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&mut self, text: &str, _from: Lang, _to: Lang) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Client for a LibreTranslate-compatible `POST /translate` endpoint.
pub struct RestTranslator {
    url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    cache: LruCache<(Lang, Lang, String), String>,
}

impl RestTranslator {
    pub fn new(url: &str, api_key: Option<String>, timeout_ms: u64, cache_size: usize) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        let cap = NonZeroUsize::new(cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Ok(Self {
            url: format!("{}/translate", url.trim_end_matches('/')),
            api_key,
            client,
            cache: LruCache::new(cap),
        })
    }
}

impl Translator for RestTranslator {
    fn translate(&mut self, text: &str, from: Lang, to: Lang) -> Result<String> {
        let key = (from, to, text.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }
        #[derive(serde::Serialize)]
        struct In<'a> {
            q: &'a str,
            source: &'a str,
            target: &'a str,
            format: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            api_key: Option<&'a str>,
        }
        #[derive(serde::Deserialize)]
        struct Out {
            #[serde(rename = "translatedText")]
            translated_text: String,
        }
        let resp: Out = self
            .client
            .post(&self.url)
            .json(&In {
                q: text,
                source: from.code(),
                target: to.code(),
                format: "text",
                api_key: self.api_key.as_deref(),
            })
            .send()?
            .error_for_status()?
            .json()?;
        tracing::trace!(event = "translated", from = %from, to = %to, chars = text.len());
        self.cache.put(key, resp.translated_text.clone());
        Ok(resp.translated_text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Identity,
    Rest,
}

impl FromStr for Provider {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "identity" | "none" => Ok(Provider::Identity),
            "rest" | "libretranslate" => Ok(Provider::Rest),
            other => Err(eyre!("unknown translation provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub provider: Provider,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub cache_size: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            provider: Provider::Identity,
            url: None,
            api_key: None,
            timeout_ms: 10_000,
            cache_size: 1024,
        }
    }
}

pub fn build_translator(opts: &TranslateOptions) -> Result<Box<dyn Translator>> {
    match opts.provider {
        Provider::Identity => Ok(Box::new(IdentityTranslator)),
        Provider::Rest => {
            let url = opts
                .url
                .as_deref()
                .ok_or_else(|| eyre!("translate.url is required for the rest provider"))?;
            tracing::info!(event = "translator", provider = "rest", url);
            Ok(Box::new(RestTranslator::new(
                url,
                opts.api_key.clone(),
                opts.timeout_ms,
                opts.cache_size,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_copies_text() {
        let mut t = IdentityTranslator;
        assert_eq!(t.translate("Eau", Lang::Fr, Lang::En).unwrap(), "Eau");
    }

    #[test]
    fn provider_parsing() {
        assert_eq!("".parse::<Provider>().unwrap(), Provider::Identity);
        assert_eq!("LibreTranslate".parse::<Provider>().unwrap(), Provider::Rest);
        assert!("argos".parse::<Provider>().is_err());
    }

    #[test]
    fn rest_provider_needs_url() {
        let opts = TranslateOptions {
            provider: Provider::Rest,
            ..Default::default()
        };
        assert!(build_translator(&opts).is_err());
        let opts = TranslateOptions {
            url: Some("http://localhost:5000/".into()),
            ..opts
        };
        assert!(build_translator(&opts).is_ok());
    }
}
