//! Orchestration layer over the lower-level crates.
//! Exposes the operations the CLI runs against an open [`Catalog`].

pub mod catalog;
pub mod codegen;
pub mod comments;
pub mod export;
pub mod import;
pub mod index;
pub mod logs;
pub mod pipeline;
pub mod references;
pub mod rules;
pub mod template;
pub mod users;

#[cfg(test)]
mod test_support;

pub use catalog::{Catalog, StoreLookup};
pub use codegen::generate_app;
pub use comments::{register_comments, Comment};
pub use datacat_core::Result;
pub use export::export_model;
pub use import::{import_model, ImportOptions};
pub use index::{build_backend, index_all};
pub use pipeline::{init, model_source, InitOptions};
pub use references::{import_references, load_reference, reference_collection};
pub use rules::{import_rules, load_rules, summarize};
pub use template::{build_import_template, template_file_name};
pub use users::{default_users, seed_users};
