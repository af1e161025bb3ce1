use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// A schemaless document as stored in the document store.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Slugs that are administrative and never exported, imported or templated.
pub const INTERNAL_SLUGS: &[&str] = &["_id", "id", "ID"];

pub fn is_internal_slug(slug: &str) -> bool {
    INTERNAL_SLUGS.contains(&slug)
}

/// Languages a multilingual model is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Fr,
    En,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::Fr, Lang::En];

    pub fn code(self) -> &'static str {
        match self {
            Lang::Fr => "fr",
            Lang::En => "en",
        }
    }

    /// The language a backfill translates into.
    pub fn other(self) -> Lang {
        match self {
            Lang::Fr => Lang::En,
            Lang::En => Lang::Fr,
        }
    }

    /// `Fr` / `En`, used in generated type names.
    pub fn title(self) -> &'static str {
        match self {
            Lang::Fr => "Fr",
            Lang::En => "En",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Lang::Fr),
            "en" => Ok(Lang::En),
            other => Err(CoreError::UnknownLang(other.to_string())),
        }
    }
}

/// Titlecase like `"data_set"` -> `"Data_Set"`: every alphabetic run starts upper-case.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown language '{0}' (expected fr or en)")]
    UnknownLang(String),
}
