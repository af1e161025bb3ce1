use datacat_core::{Lang, Result};
use datacat_domain::{CommentSummary, SCHEMA_VERSION};
use datacat_store::COMMENTS;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logs::{self, DEFAULT_USER};
use crate::Catalog;

/// One entry of the `comments` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub user: String,
    pub date: String,
    /// Model the comment belongs to.
    pub perimeter: String,
    /// Field the comment was read from.
    pub scope: String,
    pub ref_id: String,
    pub lang: String,
}

fn comment_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Null | Value::String(_) => None,
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(comment_text).collect();
            (!parts.is_empty()).then(|| parts.join("\n"))
        }
        other => Some(other.to_string()),
    }
}

/// Turn the comment fields of every `model` document into `comments` entries.
///
/// Entries previously registered for `model` are replaced; other models' are kept.
pub fn register_comments(catalog: &Catalog, model: &str) -> Result<CommentSummary> {
    let lang = Lang::Fr;
    let date = logs::now();
    let mut comments: Vec<Comment> = catalog
        .store
        .load_values::<Comment>(COMMENTS)?
        .into_iter()
        .filter(|c| c.perimeter != model)
        .collect();
    let kept = comments.len();

    for record in catalog.records(model)? {
        let Some(doc) = catalog.view(model, &record.doc, lang) else {
            continue;
        };
        for (slug, value) in doc {
            if !slug.contains("comment") {
                continue;
            }
            let Some(text) = comment_text(value) else {
                continue;
            };
            comments.push(Comment {
                text,
                user: DEFAULT_USER.to_string(),
                date: date.clone(),
                perimeter: model.to_string(),
                scope: slug.clone(),
                ref_id: record.id.clone(),
                lang: lang.code().to_string(),
            });
        }
    }

    let registered = comments.len() - kept;
    catalog.store.bulk_replace_values(COMMENTS, &comments)?;
    tracing::info!(event = "comments_registered", model, comments = registered);
    logs::record(&catalog.store, "create", "comment", true, &format!("{model}: {registered} comments"))?;
    Ok(CommentSummary {
        schema_version: SCHEMA_VERSION,
        model: model.to_string(),
        comments: registered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_skips_blank_values() {
        assert_eq!(comment_text(&json!("  ")), None);
        assert_eq!(comment_text(&Value::Null), None);
        assert_eq!(comment_text(&json!("ok ")).as_deref(), Some("ok"));
        assert_eq!(comment_text(&json!(["a", null, "b"])).as_deref(), Some("a\nb"));
    }

    #[test]
    fn comments_are_replaced_per_model() {
        use crate::import::{import_model, ImportOptions};
        use crate::references::import_references;
        use crate::test_support::{catalog_with_fixtures, fixtures};
        use datacat_translate::IdentityTranslator;

        let dir = fixtures();
        let (mut catalog, data) = catalog_with_fixtures(&dir);
        import_references(&mut catalog, &mut IdentityTranslator, &data.join("references")).unwrap();
        import_model(
            &catalog,
            &mut IdentityTranslator,
            "dataset",
            Lang::Fr,
            &data.join("datasets/datasets_fr.csv"),
            ImportOptions::default(),
        )
        .unwrap();

        let other = Comment {
            text: "hors sujet".into(),
            user: "admin".into(),
            date: "2024-01-01T00:00:00".into(),
            perimeter: "organization".into(),
            scope: "comment".into(),
            ref_id: "x".into(),
            lang: "fr".into(),
        };
        catalog
            .store
            .insert(COMMENTS, &datacat_store::to_document(COMMENTS, &other).unwrap())
            .unwrap();

        let summary = register_comments(&catalog, "dataset").unwrap();
        // Only the first row has a quality comment.
        assert_eq!(summary.comments, 1);
        let again = register_comments(&catalog, "dataset").unwrap();
        assert_eq!(again.comments, 1);

        let all: Vec<Comment> = catalog.store.load_values(COMMENTS).unwrap();
        assert_eq!(all.len(), 2);
        let c = all.iter().find(|c| c.perimeter == "dataset").unwrap();
        assert_eq!(c.text, "Données partielles");
        assert_eq!(c.scope, "comment_quality");
        assert_eq!(c.ref_id, catalog.records("dataset").unwrap()[0].id);
    }
}
