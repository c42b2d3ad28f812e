use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Storage key holding the raw session token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON-encoded user record.
pub const USER_KEY: &str = "user";

/// SessionUser
///
/// The part of the stored user record the navigation layer cares about. Any other
/// fields present in the stored JSON are ignored, and a missing role list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl SessionUser {
    pub fn with_roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Session
///
/// A point-in-time view of who is navigating. Created on login and cleared on logout
/// by whoever owns the store; the navigation gate only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    #[serde(default)]
    pub user: SessionUser,
}

impl Session {
    /// No token, no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: Some(token.into()),
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// SessionStore
///
/// Read side of wherever the current session lives. `snapshot` is the only required
/// method and must read the token and the roles under a single acquisition, so a
/// caller never sees a token from one login paired with roles from another.
pub trait SessionStore: Send + Sync {
    fn snapshot(&self) -> Session;

    fn get_token(&self) -> Option<String> {
        self.snapshot().token
    }

    fn get_user_roles(&self) -> Vec<String> {
        self.snapshot().user.roles
    }
}

/// MemorySessionStore
///
/// Holds the whole session behind one lock; login and logout swap it atomically.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, token: impl Into<String>, user: SessionUser) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Session::authenticated(token, user);
    }

    pub fn logout(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Session::anonymous();
    }
}

impl SessionStore for MemorySessionStore {
    fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// KeyValueSessionStore
///
/// A string-keyed store shaped like browser storage: the token lives under
/// [`TOKEN_KEY`] and the JSON user record under [`USER_KEY`].
#[derive(Debug, Default)]
pub struct KeyValueSessionStore {
    items: RwLock<HashMap<String, String>>,
}

impl KeyValueSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set_item(&self, key: impl Into<String>, value: impl Into<String>) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Writes the token and the user record together.
    pub fn login(&self, token: impl Into<String>, user: &SessionUser) -> serde_json::Result<()> {
        let user_json = serde_json::to_string(user)?;
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(TOKEN_KEY.to_string(), token.into());
        items.insert(USER_KEY.to_string(), user_json);
        Ok(())
    }

    pub fn logout(&self) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(TOKEN_KEY);
        items.remove(USER_KEY);
    }
}

impl SessionStore for KeyValueSessionStore {
    fn snapshot(&self) -> Session {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let token = items.get(TOKEN_KEY).cloned();

        let user = match items.get(USER_KEY) {
            None => SessionUser::default(),
            Some(raw) => serde_json::from_str::<SessionUser>(raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "Stored user record is malformed, ignoring its roles");
                SessionUser::default()
            }),
        };

        Session { token, user }
    }
}
