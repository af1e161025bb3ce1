//! Embedded document store: one sled tree per collection, JSON documents keyed
//! by an opaque identifier assigned on insert.

use std::path::Path;

use datacat_core::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const RULES: &str = "rules";
pub const REFERENCES: &str = "references";
pub const COMMENTS: &str = "comments";
pub const USERS: &str = "users";
pub const LOGS: &str = "logs";

const DEFAULT_TREE: &[u8] = b"__sled__default";

/// `dataset` -> `datasets`.
pub fn model_collection(model: &str) -> String {
    format!("{model}s")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store: {0}")]
    Sled(#[from] sled::Error),
    #[error("document encoding: {0}")]
    Json(#[from] serde_json::Error),
    #[error("collection '{0}' only stores JSON objects")]
    NotAnObject(String),
}

/// A stored document together with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub doc: Document,
}

impl Record {
    /// Document with the identifier injected under `id`.
    pub fn with_id(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id".into(), serde_json::Value::String(self.id.clone()));
        for (k, v) in &self.doc {
            if k != "id" {
                doc.insert(k.clone(), v.clone());
            }
        }
        doc
    }
}

/// Process-wide handle, opened once and passed by reference.
pub struct Store {
    db: sled::Db,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        tracing::debug!(event = "store_opened", path = %path.display());
        Ok(Self { db })
    }

    /// Throw-away store, removed when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    fn next_id(&self) -> Result<String, StoreError> {
        // Fixed-width hex keeps key order equal to insertion order.
        Ok(format!("{:016x}", self.db.generate_id()?))
    }

    pub fn insert(&self, collection: &str, doc: &Document) -> Result<String, StoreError> {
        let tree = self.db.open_tree(collection)?;
        let id = self.next_id()?;
        tree.insert(id.as_bytes(), serde_json::to_vec(doc)?)?;
        Ok(id)
    }

    /// Replace the whole content of `collection` in a single atomic batch.
    /// Returns the identifiers assigned to `docs`, in order.
    pub fn bulk_replace<I>(&self, collection: &str, docs: I) -> Result<Vec<String>, StoreError>
    where
        I: IntoIterator<Item = Document>,
    {
        let tree = self.db.open_tree(collection)?;
        let mut batch = sled::Batch::default();
        let mut removed = 0usize;
        for key in tree.iter().keys() {
            batch.remove(key?);
            removed += 1;
        }
        let mut ids = Vec::new();
        for doc in docs {
            let id = self.next_id()?;
            batch.insert(id.as_bytes(), serde_json::to_vec(&doc)?);
            ids.push(id);
        }
        tree.apply_batch(batch)?;
        tree.flush()?;
        tracing::debug!(event = "bulk_replace", collection, removed, inserted = ids.len());
        Ok(ids)
    }

    /// Serialize typed values and bulk-replace `collection` with them.
    pub fn bulk_replace_values<T: Serialize>(
        &self,
        collection: &str,
        values: &[T],
    ) -> Result<Vec<String>, StoreError> {
        let docs = values
            .iter()
            .map(|v| to_document(collection, v))
            .collect::<Result<Vec<_>, _>>()?;
        self.bulk_replace(collection, docs)
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let tree = self.db.open_tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(Record {
                id: id.to_string(),
                doc: serde_json::from_slice(&bytes)?,
            })),
            None => Ok(None),
        }
    }

    /// All documents in insertion order.
    pub fn find_all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let tree = self.db.open_tree(collection)?;
        let mut out = Vec::with_capacity(tree.len());
        for item in tree.iter() {
            let (k, v) = item?;
            out.push(Record {
                id: String::from_utf8_lossy(&k).into_owned(),
                doc: serde_json::from_slice(&v)?,
            });
        }
        Ok(out)
    }

    pub fn find_one<F>(&self, collection: &str, pred: F) -> Result<Option<Record>, StoreError>
    where
        F: Fn(&Document) -> bool,
    {
        Ok(self.find_all(collection)?.into_iter().find(|r| pred(&r.doc)))
    }

    /// Deserialize every document of `collection` into `T`.
    pub fn load_values<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        self.find_all(collection)?
            .into_iter()
            .map(|r| Ok(serde_json::from_value(serde_json::Value::Object(r.doc))?))
            .collect()
    }

    pub fn count(&self, collection: &str) -> Result<usize, StoreError> {
        Ok(self.db.open_tree(collection)?.len())
    }

    pub fn drop_collection(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.db.drop_tree(collection)?)
    }

    /// Names of non-empty collections, sorted.
    pub fn collections(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for name in self.db.tree_names() {
            if name.as_ref() == DEFAULT_TREE {
                continue;
            }
            let name = String::from_utf8_lossy(&name).into_owned();
            if self.count(&name)? > 0 {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

pub fn to_document<T: Serialize>(collection: &str, value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject(collection.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn insert_preserves_order_and_ids() {
        let store = Store::temporary().unwrap();
        let a = store.insert("datasets", &doc(json!({"n": 1}))).unwrap();
        let b = store.insert("datasets", &doc(json!({"n": 2}))).unwrap();
        assert_ne!(a, b);
        let all = store.find_all("datasets").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a);
        assert_eq!(all[1].doc["n"], json!(2));
        assert_eq!(store.get("datasets", &b).unwrap().unwrap().doc["n"], json!(2));
    }

    #[test]
    fn bulk_replace_drops_previous_content() {
        let store = Store::temporary().unwrap();
        store.insert("rules", &doc(json!({"slug": "old"}))).unwrap();
        let ids = store
            .bulk_replace("rules", vec![doc(json!({"slug": "a"})), doc(json!({"slug": "b"}))])
            .unwrap();
        assert_eq!(ids.len(), 2);
        let slugs: Vec<_> = store
            .find_all("rules")
            .unwrap()
            .into_iter()
            .map(|r| r.doc["slug"].clone())
            .collect();
        assert_eq!(slugs, vec![json!("a"), json!("b")]);
    }

    #[test]
    fn with_id_injects_identifier_first() {
        let r = Record {
            id: "00000000000000ff".into(),
            doc: doc(json!({"name": "x"})),
        };
        let d = r.with_id();
        assert_eq!(d.keys().next().map(String::as_str), Some("id"));
        assert_eq!(d["name"], json!("x"));
    }

    #[test]
    fn collections_lists_non_empty_trees() {
        let store = Store::temporary().unwrap();
        store.insert("logs", &doc(json!({"a": 1}))).unwrap();
        store.bulk_replace("users", Vec::new()).unwrap();
        assert_eq!(store.collections().unwrap(), vec!["logs".to_string()]);
        assert_eq!(model_collection("dataset"), "datasets");
    }

    #[test]
    fn typed_values_round_trip_through_collection() {
        #[derive(Serialize, serde::Deserialize, PartialEq, Debug)]
        struct U {
            username: String,
        }
        let store = Store::temporary().unwrap();
        store
            .bulk_replace_values(USERS, &[U { username: "admin".into() }])
            .unwrap();
        let back: Vec<U> = store.load_values(USERS).unwrap();
        assert_eq!(back, vec![U { username: "admin".into() }]);
        assert!(matches!(
            to_document("x", &3),
            Err(StoreError::NotAnObject(_))
        ));
    }
}
