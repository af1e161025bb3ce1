use std::cell::RefCell;
use std::collections::HashMap;

use datacat_coerce::ExternalDocuments;
use datacat_core::{Document, Lang, Result};
use datacat_rules::{Reference, ReferenceSet, Rule, RuleRegistry};
use datacat_store::{model_collection, Record, Store, REFERENCES, RULES};
use serde_json::Value;

/// The open store together with the schema loaded from it.
pub struct Catalog {
    pub store: Store,
    pub registry: RuleRegistry,
    pub references: ReferenceSet,
}

impl Catalog {
    /// Load the registry and the reference tables once; both are empty on a fresh store.
    pub fn open(store: Store) -> Result<Self> {
        let rules: Vec<Rule> = store.load_values(RULES)?;
        let references: Vec<Reference> = store.load_values(REFERENCES)?;
        tracing::debug!(event = "catalog_opened", rules = rules.len(), references = references.len());
        Ok(Self {
            store,
            registry: RuleRegistry::new(rules)?,
            references: references.into_iter().collect(),
        })
    }

    pub fn records(&self, model: &str) -> Result<Vec<Record>> {
        Ok(self.store.find_all(&model_collection(model))?)
    }

    /// Language sub-document of a stored document, or the document itself for
    /// monolingual models.
    pub fn view<'a>(&self, model: &str, doc: &'a Document, lang: Lang) -> Option<&'a Document> {
        if self.registry.is_multilang(model) {
            doc.get(lang.code()).and_then(Value::as_object)
        } else {
            Some(doc)
        }
    }
}

/// [`ExternalDocuments`] over the store. Collections are read once per model
/// and kept for the lifetime of the lookup.
pub struct StoreLookup<'a> {
    store: &'a Store,
    cache: RefCell<HashMap<String, Vec<Record>>>,
}

impl<'a> StoreLookup<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn with_records<T>(&self, model: &str, f: impl FnOnce(&[Record]) -> Option<T>) -> Option<T> {
        let mut cache = self.cache.borrow_mut();
        if !cache.contains_key(model) {
            let records = match self.store.find_all(&model_collection(model)) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(event = "lookup_failed", model, error = %e);
                    Vec::new()
                }
            };
            cache.insert(model.to_string(), records);
        }
        cache.get(model).and_then(|r| f(r))
    }
}

impl ExternalDocuments for StoreLookup<'_> {
    fn find_by_id(&self, model: &str, id: &str) -> Option<Document> {
        self.with_records(model, |records| {
            records.iter().find(|r| r.id == id).map(Record::with_id)
        })
    }

    fn find_by_display(&self, model: &str, lang: Option<Lang>, key: &str, value: &str) -> Option<Document> {
        self.with_records(model, |records| {
            records
                .iter()
                .find(|r| {
                    let scope = match lang {
                        Some(l) => r.doc.get(l.code()).and_then(Value::as_object),
                        None => Some(&r.doc),
                    };
                    scope
                        .and_then(|d| d.get(key))
                        .and_then(Value::as_str)
                        .is_some_and(|v| v == value)
                })
                .map(Record::with_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_finds_by_id_and_display() {
        let store = Store::temporary().unwrap();
        let id = store
            .insert(
                "organizations",
                json!({"fr": {"name": "Ministère"}, "en": {"name": "Ministry"}})
                    .as_object()
                    .unwrap(),
            )
            .unwrap();
        let lookup = StoreLookup::new(&store);
        let by_name = lookup
            .find_by_display("organization", Some(Lang::En), "name", "Ministry")
            .unwrap();
        assert_eq!(by_name["id"], json!(id));
        assert!(lookup.find_by_id("organization", &id).is_some());
        assert!(lookup.find_by_display("organization", Some(Lang::Fr), "name", "Ministry").is_none());
        assert!(lookup.find_by_id("user", "nope").is_none());
    }

    #[test]
    fn fresh_store_opens_with_empty_schema() {
        let catalog = Catalog::open(Store::temporary().unwrap()).unwrap();
        assert!(catalog.registry.is_empty());
        assert!(catalog.references.is_empty());
    }
}
