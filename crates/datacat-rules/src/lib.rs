//! Rule registry: the in-memory schema every other component reads.
//!
//! A [`RuleRegistry`] is loaded once (from `rules.csv` or from the `rules`
//! collection) and passed by reference; nothing re-queries the store per field.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use datacat_core::Lang;
use thiserror::Error;

pub mod reference;
pub mod rule;

pub use reference::{reference_slug, RefEntry, Reference, ReferenceSet};
pub use rule::{Datatype, FieldPolicy, Rule};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("cannot read rules: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed rules csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("rules row {row}: {message}")]
    Row { row: usize, message: String },
    #[error("rules row {row}: unknown datatype '{value}'")]
    UnknownDatatype { row: usize, value: String },
    #[error("rules row {row}: invalid slug '{slug}'")]
    InvalidSlug { row: usize, slug: String },
    #[error("duplicate rule for {model}.{slug}")]
    Duplicate { model: String, slug: String },
}

#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    index: HashMap<(String, String), usize>,
}

impl RuleRegistry {
    /// Build a registry, rejecting duplicate `(model, slug)` pairs.
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleError> {
        let mut index = HashMap::with_capacity(rules.len());
        for (i, r) in rules.iter().enumerate() {
            if index.insert((r.model.clone(), r.slug.clone()), i).is_some() {
                return Err(RuleError::Duplicate {
                    model: r.model.clone(),
                    slug: r.slug.clone(),
                });
            }
        }
        Ok(Self { rules, index })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RuleError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);
        let mut rules = Vec::new();
        for (i, row) in rdr.deserialize::<rule::RuleRow>().enumerate() {
            rules.push(row?.into_rule(i + 1)?);
        }
        tracing::debug!(event = "rules_parsed", count = rules.len());
        Self::new(rules)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, RuleError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, model: &str, slug: &str) -> Option<&Rule> {
        self.index
            .get(&(model.to_string(), slug.to_string()))
            .map(|&i| &self.rules[i])
    }

    pub fn rules_for<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.model == model)
    }

    pub fn has_model(&self, model: &str) -> bool {
        self.rules.iter().any(|r| r.model == model)
    }

    /// Distinct models in file order.
    pub fn models(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.rules {
            if !out.contains(&r.model.as_str()) {
                out.push(&r.model);
            }
        }
        out
    }

    /// A model is multilingual as soon as one of its fields is translatable.
    pub fn is_multilang(&self, model: &str) -> bool {
        self.rules_for(model).any(|r| r.translation)
    }

    pub fn is_search_model(&self, model: &str) -> bool {
        self.rules_for(model).any(|r| r.is_indexed)
    }

    pub fn is_facet_model(&self, model: &str) -> bool {
        self.rules_for(model).any(|r| r.is_facet)
    }

    /// Languages a model is stored in; `None` for monolingual models.
    pub fn langs(&self, model: &str) -> Vec<Option<Lang>> {
        if self.is_multilang(model) {
            Lang::ALL.iter().copied().map(Some).collect()
        } else {
            vec![None]
        }
    }

    /// Distinct non-empty reference tables in file order.
    pub fn reference_tables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.rules {
            if r.is_reference() && !out.contains(&r.reference_table.as_str()) {
                out.push(&r.reference_table);
            }
        }
        out
    }

    pub fn searchable_fields<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules_for(model).filter(|r| r.is_searchable())
    }

    pub fn facet_fields<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules_for(model).filter(|r| r.is_facet)
    }

    pub fn mandatory_fields<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules_for(model).filter(|r| r.mandatory)
    }

    /// Fields that appear as CSV columns for import templates and exports.
    pub fn csv_columns<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules_for(model)
            .filter(|r| !r.is_internal() && !r.is_excluded() && r.external_model != "comment")
    }

    /// Match a CSV header (label in `lang`, or the raw slug) to a rule.
    pub fn rule_for_header(&self, model: &str, lang: Lang, header: &str) -> Option<&Rule> {
        let header = header.trim();
        self.get(model, header)
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|r| r.model == model && r.label(lang) == header)
            })
    }
}
