use ember_api::{ApiError, Role, Session, SessionStore};

#[test]
fn test_missing_file_is_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("none.json"));
    assert_eq!(store.load(), Session::default());
    // Clearing a missing file is fine
    store.clear().unwrap();
}

#[test]
fn test_corrupt_file_is_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{oops").unwrap();
    assert_eq!(SessionStore::new(path).load(), Session::default());
}

#[test]
fn test_guards() {
    let guest = Session::default();
    assert!(matches!(guest.require_authenticated(), Err(ApiError::Unauthorized)));
    assert_eq!(guest.stream_token(), None);

    let user = Session {
        token: Some("t".into()),
        authenticated: true,
        role: Some(Role::User),
        email: None,
    };
    assert_eq!(user.require_authenticated().unwrap(), "t");
    assert!(matches!(user.require_admin(), Err(ApiError::Forbidden(_))));
    assert_eq!(user.stream_token().as_deref(), Some("t"));

    let admin = Session {
        role: Some(Role::Admin),
        ..user
    };
    assert!(admin.require_admin().is_ok());
    assert!(admin.is_admin());
}

#[test]
fn test_role_parse() {
    assert_eq!(Role::parse("admin"), Role::Admin);
    assert_eq!(Role::parse("ADMIN"), Role::Admin);
    assert_eq!(Role::parse("user"), Role::User);
    assert_eq!(Role::parse("moderator"), Role::User);
}
