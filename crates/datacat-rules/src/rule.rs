use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use datacat_core::{is_internal_slug, Lang};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::RuleError;

/// Closed set of field datatypes. Every coercion path matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Id,
    Boolean,
    Date,
    Url,
    Email,
    Object,
    Integer,
}

impl Datatype {
    pub fn as_str(self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Id => "id",
            Datatype::Boolean => "boolean",
            Datatype::Date => "date",
            Datatype::Url => "url",
            Datatype::Email => "email",
            Datatype::Object => "object",
            Datatype::Integer => "integer",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dt = match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Datatype::String,
            "id" => Datatype::Id,
            "boolean" | "bool" => Datatype::Boolean,
            "date" | "datetime" => Datatype::Date,
            "url" | "uri" => Datatype::Url,
            "email" => Datatype::Email,
            "object" | "dict" => Datatype::Object,
            "int" | "integer" | "number" => Datatype::Integer,
            other => return Err(other.to_string()),
        };
        Ok(dt)
    }
}

/// How a field behaves when a document is backfilled into the other language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Copied as is.
    Passthrough,
    /// Sent to the translation service.
    Machine,
    /// Looked up in the field's reference table.
    Reference,
}

/// Schema descriptor for one field of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub model: String,
    pub slug: String,
    pub datatype: Datatype,
    pub multiple: bool,
    pub translation: bool,
    pub external_model: String,
    pub reference_table: String,
    pub external_model_display_keys: Vec<String>,
    pub mandatory: bool,
    pub is_facet: bool,
    pub is_indexed: bool,
    pub is_controled: bool,
    #[serde(default)]
    pub name_fr: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description_fr: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub constraint: String,
    #[serde(default)]
    pub item_order: i64,
}

impl Rule {
    /// Minimal rule, mostly useful for tests and programmatic registries.
    pub fn new(model: &str, slug: &str, datatype: Datatype) -> Self {
        Self {
            model: model.to_string(),
            slug: slug.to_string(),
            datatype,
            multiple: false,
            translation: false,
            external_model: String::new(),
            reference_table: String::new(),
            external_model_display_keys: Vec::new(),
            mandatory: false,
            is_facet: false,
            is_indexed: false,
            is_controled: false,
            name_fr: String::new(),
            name_en: String::new(),
            description_fr: String::new(),
            description_en: String::new(),
            constraint: String::new(),
            item_order: 0,
        }
    }

    /// Column label in `lang`, falling back to the slug.
    pub fn label(&self, lang: Lang) -> &str {
        let name = match lang {
            Lang::Fr => self.name_fr.as_str(),
            Lang::En => self.name_en.as_str(),
        };
        if name.trim().is_empty() {
            &self.slug
        } else {
            name
        }
    }

    pub fn description(&self, lang: Lang) -> &str {
        match lang {
            Lang::Fr => &self.description_fr,
            Lang::En => &self.description_en,
        }
    }

    pub fn is_internal(&self) -> bool {
        is_internal_slug(&self.slug)
    }

    /// `item_order == -1` keeps a field out of templates and exports.
    pub fn is_excluded(&self) -> bool {
        self.item_order == -1
    }

    /// Points to another model (not a controlled vocabulary).
    pub fn is_external(&self) -> bool {
        !self.external_model.is_empty() && self.reference_table.is_empty()
    }

    pub fn is_reference(&self) -> bool {
        !self.reference_table.is_empty()
    }

    pub fn is_searchable(&self) -> bool {
        self.is_indexed || self.is_facet
    }

    /// First of the ordered display keys.
    pub fn display_key(&self) -> Option<&str> {
        self.external_model_display_keys
            .first()
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }

    pub fn policy(&self) -> FieldPolicy {
        if !self.translation {
            FieldPolicy::Passthrough
        } else if self.reference_table.is_empty() && !self.is_controled {
            FieldPolicy::Machine
        } else {
            FieldPolicy::Reference
        }
    }
}

/// One raw row of `rules.csv`. Every cell is text; conversion happens in [`RuleRow::into_rule`].
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RuleRow {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub datatype: String,
    #[serde(default)]
    pub multiple: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub external_model: String,
    #[serde(default)]
    pub reference_table: String,
    #[serde(default)]
    pub external_model_display_keys: String,
    #[serde(default)]
    pub mandatory: String,
    #[serde(default)]
    pub is_facet: String,
    #[serde(default, alias = "indexed")]
    pub is_indexed: String,
    #[serde(default)]
    pub is_controled: String,
    #[serde(default)]
    pub name_fr: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description_fr: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub constraint: String,
    #[serde(default, alias = "ITEM_order")]
    pub item_order: String,
}

fn slug_re() -> &'static Regex {
    static SLUG: OnceLock<Regex> = OnceLock::new();
    SLUG.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

fn parse_flag(row: usize, column: &str, value: &str) -> Result<bool, RuleError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "" | "false" | "0" | "no" | "n" => Ok(false),
        other => Err(RuleError::Row {
            row,
            message: format!("column '{column}' is not a flag: '{other}'"),
        }),
    }
}

impl RuleRow {
    /// `row` is the 1-based data row, used in error messages.
    pub(crate) fn into_rule(self, row: usize) -> Result<Rule, RuleError> {
        let model = self.model.trim().to_string();
        let slug = self.slug.trim().to_string();
        if model.is_empty() {
            return Err(RuleError::Row {
                row,
                message: "empty model".into(),
            });
        }
        if !slug_re().is_match(&slug) {
            return Err(RuleError::InvalidSlug { row, slug });
        }
        // A blank datatype is a plain string field.
        let datatype = match self.datatype.trim() {
            "" => Datatype::String,
            s => s
                .parse::<Datatype>()
                .map_err(|value| RuleError::UnknownDatatype { row, value })?,
        };
        let item_order = match self.item_order.trim() {
            "" => 0,
            s => s.parse::<i64>().map_err(|_| RuleError::Row {
                row,
                message: format!("column 'item_order' is not an integer: '{s}'"),
            })?,
        };
        Ok(Rule {
            model,
            slug,
            datatype,
            multiple: parse_flag(row, "multiple", &self.multiple)?,
            translation: parse_flag(row, "translation", &self.translation)?,
            external_model: self.external_model.trim().to_string(),
            reference_table: self.reference_table.trim().to_string(),
            external_model_display_keys: self
                .external_model_display_keys
                .split('|')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            mandatory: parse_flag(row, "mandatory", &self.mandatory)?,
            is_facet: parse_flag(row, "is_facet", &self.is_facet)?,
            is_indexed: parse_flag(row, "is_indexed", &self.is_indexed)?,
            is_controled: parse_flag(row, "is_controled", &self.is_controled)?,
            name_fr: self.name_fr.trim().to_string(),
            name_en: self.name_en.trim().to_string(),
            description_fr: self.description_fr,
            description_en: self.description_en,
            constraint: self.constraint.trim().to_string(),
            item_order,
        })
    }
}
