use datacat_config::UserCfg;
use datacat_core::Result;
use datacat_store::USERS;

use crate::logs::{self, DEFAULT_USER};
use crate::Catalog;

/// The administrator account used when the configuration declares none.
pub fn default_users() -> Vec<UserCfg> {
    vec![UserCfg {
        username: DEFAULT_USER.to_string(),
        email: "admin@localhost".to_string(),
        first_name: "Admin".to_string(),
        last_name: String::new(),
        organization: String::new(),
        roles: vec!["admin".to_string(), "expert".to_string()],
        is_active: true,
        is_superuser: true,
        lang: "fr".to_string(),
    }]
}

/// Replace the `users` collection. Returns the number of accounts written.
pub fn seed_users(catalog: &Catalog, users: &[UserCfg]) -> Result<usize> {
    let users = if users.is_empty() {
        tracing::debug!(event = "default_users_used");
        default_users()
    } else {
        users.to_vec()
    };
    catalog.store.bulk_replace_values(USERS, &users)?;
    tracing::info!(event = "users_seeded", users = users.len());
    logs::record(&catalog.store, "create", "user", true, &format!("{} users", users.len()))?;
    Ok(users.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datacat_store::Store;

    #[test]
    fn configured_users_replace_collection() {
        let catalog = Catalog::open(Store::temporary().unwrap()).unwrap();
        assert_eq!(seed_users(&catalog, &[]).unwrap(), 1);
        let mut editor = default_users().remove(0);
        editor.username = "editor".into();
        editor.is_superuser = false;
        let mut reader = editor.clone();
        reader.username = "reader".into();
        assert_eq!(seed_users(&catalog, &[editor, reader]).unwrap(), 2);
        let stored: Vec<UserCfg> = catalog.store.load_values(USERS).unwrap();
        let names: Vec<&str> = stored.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["editor", "reader"]);
    }
}
