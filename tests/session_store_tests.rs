use biodiversity_portal::{
    KeyValueSessionStore, MemorySessionStore, Session, SessionStore, SessionUser,
    session::{TOKEN_KEY, USER_KEY},
};
use std::sync::Arc;
use std::thread;

#[test]
fn test_memory_store_starts_anonymous() {
    let store = MemorySessionStore::new();
    assert_eq!(store.snapshot(), Session::anonymous());
    assert_eq!(store.get_token(), None);
    assert!(store.get_user_roles().is_empty());
}

#[test]
fn test_memory_store_login_logout() {
    let store = MemorySessionStore::new();
    store.login("jwt-1", SessionUser::with_roles(["observer", "admin"]));

    assert_eq!(store.get_token().as_deref(), Some("jwt-1"));
    // Role order is preserved.
    assert_eq!(store.get_user_roles(), vec!["observer", "admin"]);

    store.logout();
    assert_eq!(store.snapshot(), Session::anonymous());
}

#[test]
fn test_memory_store_snapshot_is_never_torn() {
    // Each login pairs a token with a role list derived from it; a reader must never see
    // one login's token with another login's roles.
    let store = Arc::new(MemorySessionStore::new());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..2_000 {
                if i % 3 == 0 {
                    store.logout();
                } else {
                    store.login(format!("token-{i}"), SessionUser::with_roles([format!("role-{i}")]));
                }
            }
        })
    };

    for _ in 0..2_000 {
        let session = store.snapshot();
        match session.token {
            None => assert!(session.user.roles.is_empty()),
            Some(token) => {
                let n = token.trim_start_matches("token-");
                assert_eq!(session.user.roles, vec![format!("role-{n}")]);
            }
        }
    }

    writer.join().unwrap();
}

#[test]
fn test_key_value_store_snapshot_is_never_torn() {
    // login writes the token and user keys together; a reader must never see a token
    // next to another login's user record, or a token with the user already removed.
    let store = Arc::new(KeyValueSessionStore::new());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..2_000 {
                if i % 3 == 0 {
                    store.logout();
                } else {
                    let user = SessionUser::with_roles([format!("role-{i}")]);
                    store.login(format!("token-{i}"), &user).unwrap();
                }
            }
        })
    };

    for _ in 0..2_000 {
        let session = store.snapshot();
        match session.token {
            None => assert!(session.user.roles.is_empty()),
            Some(token) => {
                let n = token.trim_start_matches("token-");
                assert_eq!(session.user.roles, vec![format!("role-{n}")]);
            }
        }
    }

    writer.join().unwrap();
}

#[test]
fn test_key_value_store_reads_token_and_user_json() {
    let store = KeyValueSessionStore::new();
    store.set_item(TOKEN_KEY, "jwt-2");
    store.set_item(USER_KEY, r#"{"id":"u1","username":"ana","roles":["admin"]}"#);

    let session = store.snapshot();
    assert_eq!(session.token.as_deref(), Some("jwt-2"));
    assert!(session.user.has_role("admin"));
}

#[test]
fn test_key_value_store_user_without_roles() {
    let store = KeyValueSessionStore::new();
    store.set_item(TOKEN_KEY, "jwt-3");
    store.set_item(USER_KEY, "{}");

    assert!(store.get_user_roles().is_empty());
    assert!(store.snapshot().is_authenticated());
}

#[test]
fn test_key_value_store_malformed_user_is_roleless() {
    let store = KeyValueSessionStore::new();
    store.set_item(TOKEN_KEY, "jwt-4");
    store.set_item(USER_KEY, "not json");

    let session = store.snapshot();
    assert!(session.is_authenticated());
    assert!(session.user.roles.is_empty());
}

#[test]
fn test_key_value_store_token_without_user() {
    let store = KeyValueSessionStore::new();
    store.set_item(TOKEN_KEY, "jwt-5");

    assert_eq!(store.get_token().as_deref(), Some("jwt-5"));
    assert!(store.get_user_roles().is_empty());
}

#[test]
fn test_key_value_store_login_logout_touch_both_keys() {
    let store = KeyValueSessionStore::new();
    store
        .login("jwt-6", &SessionUser::with_roles(["observer"]))
        .unwrap();

    assert_eq!(store.get_item(TOKEN_KEY).as_deref(), Some("jwt-6"));
    assert_eq!(
        store.get_item(USER_KEY).as_deref(),
        Some(r#"{"roles":["observer"]}"#)
    );

    store.logout();
    assert_eq!(store.get_item(TOKEN_KEY), None);
    assert_eq!(store.get_item(USER_KEY), None);
    assert_eq!(store.snapshot(), Session::anonymous());
}

#[test]
fn test_remove_item_clears_only_that_key() {
    let store = KeyValueSessionStore::new();
    store
        .login("jwt-7", &SessionUser::with_roles(["admin"]))
        .unwrap();
    store.remove_item(TOKEN_KEY);

    let session = store.snapshot();
    assert!(!session.is_authenticated());
    assert!(session.user.has_role("admin"));
}
