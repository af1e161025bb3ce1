//! Controlled vocabularies ("reference tables") backing reference fields.

use std::collections::BTreeMap;

use datacat_core::Lang;
use serde::{Deserialize, Serialize};

/// One term of a controlled vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntry {
    #[serde(default)]
    pub name_fr: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub uri: String,
    /// Any other column of the source file, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl RefEntry {
    /// Build from a CSV row; keys and values are trimmed.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entry = RefEntry::default();
        for (k, v) in pairs {
            let (k, v) = (k.trim(), v.trim().to_string());
            match k {
                "name_fr" => entry.name_fr = v,
                "name_en" => entry.name_en = v,
                "uri" => entry.uri = v,
                "" => {}
                other => {
                    entry.extra.insert(other.to_string(), v);
                }
            }
        }
        entry
    }

    pub fn name(&self, lang: Lang) -> &str {
        match lang {
            Lang::Fr => &self.name_fr,
            Lang::En => &self.name_en,
        }
    }

    pub fn set_name(&mut self, lang: Lang, value: String) {
        match lang {
            Lang::Fr => self.name_fr = value,
            Lang::En => self.name_en = value,
        }
    }

    /// Language whose name is missing while the other one is present.
    pub fn missing_lang(&self) -> Option<Lang> {
        match (self.name_fr.is_empty(), self.name_en.is_empty()) {
            (true, false) => Some(Lang::Fr),
            (false, true) => Some(Lang::En),
            _ => None,
        }
    }

    pub fn has_no_name(&self) -> bool {
        self.name_fr.is_empty() && self.name_en.is_empty()
    }

    /// Columns in a stable order: names, uri, then the extra columns.
    pub fn columns(&self) -> Vec<(String, String)> {
        let mut cols = vec![
            ("name_fr".to_string(), self.name_fr.clone()),
            ("name_en".to_string(), self.name_en.clone()),
            ("uri".to_string(), self.uri.clone()),
        ];
        cols.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        cols
    }
}

/// A named controlled vocabulary as registered in the `references` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub table_name: String,
    pub slug: String,
    pub refs: Vec<RefEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_uri: Option<String>,
    /// `false` when the source file was missing.
    pub status: bool,
}

impl Reference {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            slug: reference_slug(table_name).to_string(),
            refs: Vec::new(),
            root_uri: None,
            status: false,
        }
    }

    pub fn find(&self, lang: Lang, name: &str) -> Option<&RefEntry> {
        self.refs.iter().find(|r| r.name(lang) == name)
    }
}

/// `ref_theme` -> `theme`.
pub fn reference_slug(table_name: &str) -> &str {
    table_name.strip_prefix("ref_").unwrap_or(table_name)
}

/// All loaded reference tables, keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    tables: BTreeMap<String, Reference>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: Reference) {
        self.tables.insert(reference.table_name.clone(), reference);
    }

    pub fn get(&self, table_name: &str) -> Option<&Reference> {
        self.tables.get(table_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Name in the other language of the term named `value` in `from`.
    pub fn translated_name(&self, table_name: &str, value: &str, from: Lang) -> Option<&str> {
        if value.is_empty() {
            return None;
        }
        self.get(table_name)?
            .find(from, value)
            .map(|r| r.name(from.other()))
            .filter(|n| !n.is_empty())
    }

    /// Distinct non-empty names of a table in `lang`, in table order.
    pub fn names(&self, table_name: &str, lang: Lang) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(r) = self.get(table_name) {
            for e in &r.refs {
                let n = e.name(lang);
                if !n.is_empty() && !out.contains(&n) {
                    out.push(n);
                }
            }
        }
        out
    }
}

impl FromIterator<Reference> for ReferenceSet {
    fn from_iter<T: IntoIterator<Item = Reference>>(iter: T) -> Self {
        let mut set = ReferenceSet::new();
        for r in iter {
            set.insert(r);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> Reference {
        let mut r = Reference::new("ref_theme");
        r.refs.push(RefEntry::from_pairs([
            ("name_fr", " Air "),
            ("name_en", "Air"),
            ("uri", "http://ex.org/theme/air"),
        ]));
        r.refs.push(RefEntry::from_pairs([
            ("name_fr", "Eau"),
            ("name_en", "Water"),
            ("code", "W"),
        ]));
        r.status = true;
        r
    }

    #[test]
    fn slug_strips_prefix() {
        assert_eq!(theme().slug, "theme");
        assert_eq!(reference_slug("perimeter"), "perimeter");
    }

    #[test]
    fn translated_name_follows_table() {
        let set: ReferenceSet = [theme()].into_iter().collect();
        assert_eq!(set.translated_name("ref_theme", "Eau", Lang::Fr), Some("Water"));
        assert_eq!(set.translated_name("ref_theme", "Water", Lang::En), Some("Eau"));
        assert_eq!(set.translated_name("ref_theme", "Feu", Lang::Fr), None);
        assert_eq!(set.translated_name("ref_other", "Eau", Lang::Fr), None);
    }

    #[test]
    fn entry_keeps_extra_columns_and_trims() {
        let r = theme();
        assert_eq!(r.refs[0].name_fr, "Air");
        assert_eq!(r.refs[1].extra.get("code").map(String::as_str), Some("W"));
    }

    #[test]
    fn missing_lang_detection() {
        let mut e = RefEntry::default();
        assert!(e.has_no_name());
        assert_eq!(e.missing_lang(), None);
        e.name_fr = "Sol".into();
        assert_eq!(e.missing_lang(), Some(Lang::En));
    }
}
