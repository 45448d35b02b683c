use chrono::{DateTime, Local};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use webbrowser::Browser;

use crate::config::Config;
use crate::storage::{self, KeyValueStore, AUTH_USER, GUEST_STATS_KEY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthUser {
    Guest {
        id: String,
        name: String,
        joined: DateTime<Local>,
    },
    User {
        id: String,
        name: Option<String>,
        email: Option<String>,
        #[serde(rename = "photoURL")]
        photo_url: Option<String>,
    },
}

impl AuthUser {
    pub fn id(&self) -> &str {
        match self {
            AuthUser::Guest { id, .. } | AuthUser::User { id, .. } => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            AuthUser::Guest { name, .. } => name,
            AuthUser::User { name, email, .. } => name
                .as_deref()
                .or(email.as_deref())
                .unwrap_or("Signed in"),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, AuthUser::Guest { .. })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no web browser available to start sign-in")]
    NoBrowser,
    #[error("could not open browser: {0}")]
    Browser(#[from] std::io::Error),
}

pub fn current_user(store: &dyn KeyValueStore) -> Option<AuthUser> {
    storage::load(store, AUTH_USER)
}

fn guest_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Create a local guest identity and keep its stats under a predictable key
pub fn continue_as_guest(store: &dyn KeyValueStore) -> AuthUser {
    let id = format!("guest_{}", guest_suffix());
    let user = AuthUser::Guest {
        id: id.clone(),
        name: "Guest".to_string(),
        joined: Local::now(),
    };
    storage::save(store, AUTH_USER, &user);
    storage::save(store, GUEST_STATS_KEY, &format!("guest_stats_{id}"));
    log::info!("continuing as guest {id}");
    user
}

/// Hand the OAuth flow to the system browser
pub fn sign_in_with_google(config: &Config) -> Result<(), AuthError> {
    if !Browser::is_available() {
        return Err(AuthError::NoBrowser);
    }
    let url = config.oauth_start_url();
    log::info!("opening {url} for sign-in");
    webbrowser::open(&url)?;
    Ok(())
}

/// Record an identity returned by the provider
pub fn complete_sign_in(store: &dyn KeyValueStore, user: AuthUser) -> AuthUser {
    storage::save(store, AUTH_USER, &user);
    user
}

pub fn sign_out(store: &dyn KeyValueStore) {
    storage::remove(store, AUTH_USER);
    log::info!("signed out");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn guest_id_has_expected_shape() {
        let store = MemoryStore::new();
        let user = continue_as_guest(&store);
        let id = user.id();
        assert!(id.starts_with("guest_"));
        let suffix = &id["guest_".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn guest_is_persisted_with_stats_key() {
        let store = MemoryStore::new();
        let user = continue_as_guest(&store);
        assert_eq!(current_user(&store), Some(user.clone()));
        let key: String = storage::load(&store, GUEST_STATS_KEY).unwrap();
        assert_eq!(key, format!("guest_stats_{}", user.id()));
    }

    #[test]
    fn sign_out_clears_user() {
        let store = MemoryStore::new();
        continue_as_guest(&store);
        sign_out(&store);
        assert_eq!(current_user(&store), None);
    }

    #[test]
    fn provider_user_deserializes_from_stored_shape() {
        let store = MemoryStore::new();
        store
            .set(
                AUTH_USER,
                &json!({
                    "type": "user",
                    "id": "uid-1",
                    "name": "Ada",
                    "email": "ada@example.test",
                    "photoURL": null
                }),
            )
            .unwrap();
        let user = current_user(&store).unwrap();
        assert_matches!(&user, AuthUser::User { id, photo_url: None, .. } if id == "uid-1");
        assert_eq!(user.display_name(), "Ada");
        assert!(!user.is_guest());
    }

    #[test]
    fn garbage_auth_user_reads_as_signed_out() {
        let store = MemoryStore::new();
        store.set(AUTH_USER, &json!({"type": "alien"})).unwrap();
        assert_eq!(current_user(&store), None);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = AuthUser::User {
            id: "x".into(),
            name: None,
            email: Some("e@x.test".into()),
            photo_url: None,
        };
        assert_eq!(user.display_name(), "e@x.test");
    }
}
