//! Source text of the generated axum application.

use std::collections::BTreeSet;
use std::fmt::Write;

use datacat_core::{Lang, Result};
use datacat_rules::{reference_slug, ReferenceSet, RuleRegistry};

use crate::types::{
    declared_type, field_ident, filter_name, filter_type, reference_type_name, type_name,
};

const HEADER: &str = "// Generated by datacat. Do not edit.";

/// What the router and services of one module expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPlan {
    pub name: String,
    pub collection: String,
    pub langs: Vec<Option<Lang>>,
    pub search: bool,
    pub facet: bool,
}

impl ModelPlan {
    pub fn from_registry(registry: &RuleRegistry, model: &str) -> Self {
        Self {
            name: model.to_string(),
            collection: format!("{model}s"),
            langs: registry.langs(model),
            search: registry.is_search_model(model),
            facet: registry.is_facet_model(model),
        }
    }

    /// The administrative `rule` module listing the schema itself.
    pub fn rules() -> Self {
        Self {
            name: "rule".into(),
            collection: "rules".into(),
            langs: vec![None],
            search: false,
            facet: false,
        }
    }

    fn route_base(&self, lang: Option<Lang>) -> String {
        match lang {
            Some(l) => format!("/{}/{l}", self.name),
            None => format!("/{}", self.name),
        }
    }
}

fn suffix(lang: Option<Lang>) -> String {
    lang.map(|l| format!("_{l}")).unwrap_or_default()
}

fn lang_arg(lang: Option<Lang>) -> String {
    match lang {
        Some(l) => format!("Some(\"{l}\")"),
        None => "None".to_string(),
    }
}

/// `models.rs` of `model`: one struct per language plus the filter structs.
pub fn render_models(registry: &RuleRegistry, model: &str) -> Result<String> {
    let langs = registry.langs(model);
    let facet = registry.is_facet_model(model);
    let mut imports: BTreeSet<String> = BTreeSet::new();
    for rule in registry.rules_for(model) {
        for &lang in &langs {
            if rule.is_reference() && rule.is_controled {
                imports.insert(format!(
                    "crate::reference::models::{}",
                    reference_type_name(&rule.reference_table, lang)
                ));
            } else if rule.is_external() && rule.external_model != model {
                let ext = &rule.external_model;
                let ext_lang = registry.is_multilang(ext).then(|| lang.unwrap_or(Lang::En));
                imports.insert(format!("crate::{ext}::models::{}", type_name(ext, ext_lang)));
            }
        }
    }

    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    writeln!(out, "#![allow(non_camel_case_types)]")?;
    writeln!(out)?;
    writeln!(out, "use serde::{{Deserialize, Serialize}};")?;
    if !imports.is_empty() {
        writeln!(out)?;
        for path in &imports {
            writeln!(out, "use {path};")?;
        }
    }
    for &lang in &langs {
        writeln!(out)?;
        writeln!(out, "#[derive(Debug, Clone, Serialize, Deserialize)]")?;
        writeln!(out, "pub struct {} {{", type_name(model, lang))?;
        writeln!(out, "    #[serde(default)]")?;
        writeln!(out, "    pub id: Option<String>,")?;
        for rule in registry.rules_for(model).filter(|r| !r.is_internal()) {
            if !rule.mandatory || rule.multiple {
                writeln!(out, "    #[serde(default)]")?;
            }
            writeln!(
                out,
                "    pub {}: {},",
                field_ident(&rule.slug),
                declared_type(registry, rule, lang)
            )?;
        }
        writeln!(out, "}}")?;
        if facet {
            writeln!(out)?;
            writeln!(out, "#[derive(Debug, Clone, Default, Serialize, Deserialize)]")?;
            writeln!(out, "pub struct {} {{", filter_name(model, lang))?;
            for rule in registry.facet_fields(model) {
                writeln!(out, "    #[serde(default, skip_serializing_if = \"Option::is_none\")]")?;
                writeln!(
                    out,
                    "    pub {}: {},",
                    field_ident(&rule.slug),
                    filter_type(registry, rule, lang)
                )?;
            }
            writeln!(out, "}}")?;
        }
    }
    Ok(out)
}

/// `reference/models.rs`: one enum per controlled vocabulary and language.
/// Variants are `Option<i>` renamed to the term.
pub fn render_reference_models(registry: &RuleRegistry, references: &ReferenceSet) -> Result<String> {
    let controlled: BTreeSet<&str> = registry
        .rules()
        .iter()
        .filter(|r| r.is_reference() && r.is_controled)
        .map(|r| r.reference_table.as_str())
        .collect();
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    writeln!(out, "#![allow(non_camel_case_types)]")?;
    writeln!(out)?;
    writeln!(out, "use serde::{{Deserialize, Serialize}};")?;
    for table in controlled {
        for lang in Lang::ALL {
            let names = references.names(table, lang);
            writeln!(out)?;
            writeln!(out, "/// `{}` terms in `{lang}`.", reference_slug(table))?;
            writeln!(
                out,
                "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]"
            )?;
            if names.is_empty() {
                // Empty vocabularies still need a type for the models that name them.
                writeln!(out, "#[serde(transparent)]")?;
                writeln!(out, "pub struct {}(());", reference_type_name(table, Some(lang)))?;
                continue;
            }
            writeln!(out, "pub enum {} {{", reference_type_name(table, Some(lang)))?;
            for (i, name) in names.iter().enumerate() {
                writeln!(out, "    #[serde(rename = {name:?})]")?;
                writeln!(out, "    Option{i},")?;
            }
            writeln!(out, "}}")?;
        }
    }
    Ok(out)
}

/// `rule/models.rs`: the shape of a stored rule.
pub fn render_rule_models() -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    writeln!(out)?;
    writeln!(out, "use serde::{{Deserialize, Serialize}};")?;
    writeln!(out)?;
    writeln!(out, "#[derive(Debug, Clone, Serialize, Deserialize)]")?;
    writeln!(out, "pub struct Rule {{")?;
    writeln!(out, "    #[serde(default)]")?;
    writeln!(out, "    pub id: Option<String>,")?;
    for (field, ty) in [
        ("model", "String"),
        ("slug", "String"),
        ("datatype", "String"),
        ("multiple", "bool"),
        ("translation", "bool"),
        ("external_model", "String"),
        ("reference_table", "String"),
        ("external_model_display_keys", "Vec<String>"),
        ("mandatory", "bool"),
        ("is_facet", "bool"),
        ("is_indexed", "bool"),
        ("is_controled", "bool"),
        ("name_fr", "String"),
        ("name_en", "String"),
        ("description_fr", "String"),
        ("description_en", "String"),
        ("constraint", "String"),
        ("item_order", "i64"),
    ] {
        writeln!(out, "    #[serde(default)]")?;
        writeln!(out, "    pub {field}: {ty},")?;
    }
    writeln!(out, "}}")?;
    Ok(out)
}

/// `routes.rs` of a module: list and get per language, plus search and
/// filter endpoints for searchable and facet models.
pub fn render_routes(plan: &ModelPlan, rule_type: Option<&str>) -> Result<String> {
    let mut models: Vec<String> = Vec::new();
    for &lang in &plan.langs {
        models.push(rule_type.map_or_else(|| type_name(&plan.name, lang), str::to_string));
        if plan.facet {
            models.push(filter_name(&plan.name, lang));
        }
    }
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    writeln!(out)?;
    if plan.search {
        writeln!(out, "use axum::extract::{{Path, Query, State}};")?;
    } else {
        writeln!(out, "use axum::extract::{{Path, State}};")?;
    }
    if plan.facet {
        writeln!(out, "use axum::routing::{{get, post}};")?;
    } else {
        writeln!(out, "use axum::routing::get;")?;
    }
    writeln!(out, "use axum::{{Json, Router}};")?;
    writeln!(out)?;
    writeln!(out, "use super::models::{{{}}};", models.join(", "))?;
    if plan.search {
        writeln!(out, "use super::services::{{self, SearchQuery}};")?;
    } else {
        writeln!(out, "use super::services;")?;
    }
    writeln!(out, "use crate::{{ApiError, AppState}};")?;
    writeln!(out)?;
    writeln!(out, "pub fn router() -> Router<AppState> {{")?;
    writeln!(out, "    Router::new()")?;
    for &lang in &plan.langs {
        let base = plan.route_base(lang);
        let s = suffix(lang);
        writeln!(out, "        .route(\"{base}\", get(list{s}))")?;
        if plan.search {
            writeln!(out, "        .route(\"{base}/search\", get(search{s}))")?;
        }
        if plan.facet {
            writeln!(out, "        .route(\"{base}/filter\", post(filter{s}))")?;
        }
        writeln!(out, "        .route(\"{base}/:id\", get(get{s}))")?;
    }
    writeln!(out, "}}")?;

    for &lang in &plan.langs {
        let s = suffix(lang);
        let ty = rule_type.map_or_else(|| type_name(&plan.name, lang), str::to_string);
        let arg = lang_arg(lang);
        let index = match lang {
            Some(l) => format!("{}_{l}", plan.name),
            None => plan.name.clone(),
        };
        writeln!(out)?;
        writeln!(
            out,
            "async fn list{s}(State(state): State<AppState>) -> Result<Json<Vec<{ty}>>, ApiError> {{"
        )?;
        writeln!(out, "    services::list(&state, {arg}).map(Json)")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "async fn get{s}(")?;
        writeln!(out, "    State(state): State<AppState>,")?;
        writeln!(out, "    Path(id): Path<String>,")?;
        writeln!(out, ") -> Result<Json<{ty}>, ApiError> {{")?;
        writeln!(out, "    services::get_one(&state, {arg}, &id).map(Json)")?;
        writeln!(out, "}}")?;
        if plan.search {
            writeln!(out)?;
            writeln!(out, "async fn search{s}(")?;
            writeln!(out, "    State(state): State<AppState>,")?;
            writeln!(out, "    Query(query): Query<SearchQuery>,")?;
            writeln!(out, ") -> Result<Json<serde_json::Value>, ApiError> {{")?;
            writeln!(out, "    services::search(&state, \"{index}\", &query.q).await.map(Json)")?;
            writeln!(out, "}}")?;
        }
        if plan.facet {
            writeln!(out)?;
            writeln!(out, "async fn filter{s}(")?;
            writeln!(out, "    State(state): State<AppState>,")?;
            writeln!(out, "    Json(filter): Json<{}>,", filter_name(&plan.name, lang))?;
            writeln!(out, ") -> Result<Json<serde_json::Value>, ApiError> {{")?;
            writeln!(out, "    services::filter(&state, \"{index}\", &filter).await.map(Json)")?;
            writeln!(out, "}}")?;
        }
    }
    Ok(out)
}

/// `services.rs` of a module: store reads and search engine queries.
pub fn render_services(registry: &RuleRegistry, plan: &ModelPlan) -> Result<String> {
    let search_fields: Vec<String> = registry
        .rules_for(&plan.name)
        .filter(|r| r.is_indexed)
        .map(|r| format!("{:?}", r.slug))
        .collect();
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    writeln!(out)?;
    writeln!(out, "use axum::http::StatusCode;")?;
    writeln!(out, "use serde::de::DeserializeOwned;")?;
    writeln!(out, "use serde::{{Deserialize, Serialize}};")?;
    writeln!(out, "use serde_json::{{json, Value}};")?;
    writeln!(out)?;
    writeln!(out, "use crate::{{ApiError, AppState}};")?;
    writeln!(out)?;
    writeln!(out, "pub const COLLECTION: &str = {:?};", plan.collection)?;
    writeln!(out, "pub const SEARCH_FIELDS: &[&str] = &[{}];", search_fields.join(", "))?;
    writeln!(out)?;
    writeln!(out, "#[derive(Debug, Deserialize)]")?;
    writeln!(out, "pub struct SearchQuery {{")?;
    writeln!(out, "    pub q: String,")?;
    writeln!(out, "}}")?;
    out.push_str(SERVICES_BODY);
    Ok(out)
}

const SERVICES_BODY: &str = r#"
fn decode<T: DeserializeOwned>(record: datacat_store::Record, lang: Option<&str>) -> Result<T, ApiError> {
    let mut doc = Value::Object(record.doc);
    let mut view = match lang {
        Some(l) => doc[l].take(),
        None => doc,
    };
    view["id"] = json!(record.id);
    Ok(serde_json::from_value(view)?)
}

pub fn list<T: DeserializeOwned>(state: &AppState, lang: Option<&str>) -> Result<Vec<T>, ApiError> {
    state
        .store
        .find_all(COLLECTION)?
        .into_iter()
        .map(|r| decode(r, lang))
        .collect()
}

pub fn get_one<T: DeserializeOwned>(state: &AppState, lang: Option<&str>, id: &str) -> Result<T, ApiError> {
    match state.store.get(COLLECTION, id)? {
        Some(record) => decode(record, lang),
        None => Err(ApiError(StatusCode::NOT_FOUND, format!("{id} not found"))),
    }
}

pub async fn search(state: &AppState, index: &str, q: &str) -> Result<Value, ApiError> {
    let body = json!({"query": {"multi_match": {"query": q, "fields": SEARCH_FIELDS}}});
    query(state, index, &body).await
}

pub async fn filter<F: Serialize>(state: &AppState, index: &str, filter: &F) -> Result<Value, ApiError> {
    let mut terms = Vec::new();
    if let Value::Object(fields) = serde_json::to_value(filter)? {
        for (field, value) in fields {
            match value {
                Value::Null => {}
                Value::Array(values) => terms.push(json!({"terms": {format!("{field}.raw"): values}})),
                other => terms.push(json!({"term": {format!("{field}.raw"): other}})),
            }
        }
    }
    let body = json!({"query": {"bool": {"filter": terms}}});
    query(state, index, &body).await
}

async fn query(state: &AppState, index: &str, body: &Value) -> Result<Value, ApiError> {
    let url = format!("{}/{index}/_search", state.search_url);
    let resp = state.search.post(url).json(body).send().await?;
    Ok(resp.error_for_status()?.json().await?)
}
"#;

/// `mod.rs` of a generated module.
pub fn render_mod(with_routes: bool) -> String {
    if with_routes {
        format!("{HEADER}\n\npub mod models;\npub mod routes;\npub mod services;\n")
    } else {
        format!("{HEADER}\n\npub mod models;\n")
    }
}

/// Top-level `main.rs` mounting every router.
pub fn render_main(modules: &[String], routers: &[String]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    writeln!(out)?;
    for m in modules {
        writeln!(out, "mod {m};")?;
    }
    writeln!(out)?;
    writeln!(out, "use std::sync::Arc;")?;
    writeln!(out)?;
    writeln!(out, "use axum::http::StatusCode;")?;
    writeln!(out, "use axum::response::{{IntoResponse, Response}};")?;
    writeln!(out, "use axum::Router;")?;
    out.push_str(MAIN_PRELUDE);
    writeln!(out, "    let app = Router::new()")?;
    for r in routers {
        writeln!(out, "        .merge({r}::routes::router())")?;
    }
    writeln!(out, "        .with_state(state);")?;
    out.push_str(MAIN_TAIL);
    Ok(out)
}

const MAIN_PRELUDE: &str = r#"
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<datacat_store::Store>,
    pub search: reqwest::Client,
    pub search_url: String,
}

#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

impl<E: std::error::Error> From<E> for ApiError {
    fn from(e: E) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store_path = std::env::var("DATACAT_STORE").unwrap_or_else(|_| "data/store".into());
    let state = AppState {
        store: Arc::new(datacat_store::Store::open(std::path::Path::new(&store_path))?),
        search: reqwest::Client::new(),
        search_url: std::env::var("DATACAT_SEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".into()),
    };
"#;

const MAIN_TAIL: &str = r#"    let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
    axum::serve(listener, app).await?;
    Ok(())
}
"#;
