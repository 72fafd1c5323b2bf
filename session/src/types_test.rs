use super::*;
use time::macros::datetime;

fn sample_user() -> User {
    User {
        id: "u-1".to_owned(),
        email: "a@b.com".to_owned(),
        full_name: "Ayu Lestari".to_owned(),
        username: None,
    }
}

fn sample_grant() -> TokenGrant {
    TokenGrant {
        token: "access-1".to_owned(),
        refresh_token: "refresh-1".to_owned(),
        expires_at: datetime!(2026-01-01 01:00 UTC),
        refresh_expires_at: datetime!(2026-01-08 00:00 UTC),
    }
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn login_response_parses_backend_shape() {
    let raw = serde_json::json!({
        "token": "access-1",
        "refresh_token": "refresh-1",
        "expires_at": "2026-01-01T01:00:00Z",
        "refresh_expires_at": "2026-01-08T00:00:00Z",
        "user": { "id": "u-1", "email": "a@b.com", "full_name": "Ayu Lestari", "username": "ayu" }
    });
    let resp: LoginResponse = serde_json::from_value(raw).unwrap();
    assert_eq!(resp.grant, sample_grant());
    assert_eq!(resp.user.username.as_deref(), Some("ayu"));
}

#[test]
fn token_grant_accepts_offset_timestamps() {
    let raw = serde_json::json!({
        "token": "t",
        "refresh_token": "r",
        "expires_at": "2026-01-01T08:00:00+07:00",
        "refresh_expires_at": "2026-01-08T00:00:00Z",
    });
    let grant: TokenGrant = serde_json::from_value(raw).unwrap();
    assert_eq!(grant.expires_at, datetime!(2026-01-01 01:00 UTC));
}

#[test]
fn create_tenant_input_omits_absent_fields() {
    let input = CreateTenantInput { name: "Acme".to_owned(), phone: Some("0812".to_owned()), ..Default::default() };
    assert_eq!(serde_json::to_value(&input).unwrap(), serde_json::json!({ "name": "Acme", "phone": "0812" }));
}

#[test]
fn tenant_response_grant_requires_all_token_fields() {
    let full: TenantResponse = serde_json::from_value(serde_json::json!({
        "tenant": { "id": "t-1" },
        "access_token": "access-2",
        "refresh_token": "refresh-2",
        "expires_at": "2026-01-01T02:00:00Z",
        "refresh_expires_at": "2026-01-09T00:00:00Z",
    }))
    .unwrap();
    let grant = full.grant().unwrap();
    assert_eq!(grant.token, "access-2");
    assert_eq!(grant.expires_at, datetime!(2026-01-01 02:00 UTC));

    let partial: TenantResponse =
        serde_json::from_value(serde_json::json!({ "access_token": "access-2", "message": "ok" })).unwrap();
    assert!(partial.grant().is_none());
    assert_eq!(partial.message.as_deref(), Some("ok"));
}

// =============================================================
// Session
// =============================================================

#[test]
fn session_from_login_response_copies_all_fields() {
    let session = Session::from(LoginResponse { grant: sample_grant(), user: sample_user() });
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.refresh_token, "refresh-1");
    assert_eq!(session.access_expires_at, datetime!(2026-01-01 01:00 UTC));
    assert_eq!(session.refresh_expires_at, datetime!(2026-01-08 00:00 UTC));
    assert_eq!(session.user, sample_user());
}

#[test]
fn renewed_session_keeps_user_and_replaces_tokens() {
    let session = Session::new(sample_user(), sample_grant());
    let next = TokenGrant {
        token: "access-2".to_owned(),
        refresh_token: "refresh-2".to_owned(),
        expires_at: datetime!(2026-01-01 02:00 UTC),
        refresh_expires_at: datetime!(2026-01-09 00:00 UTC),
    };
    let renewed = session.renewed(next);
    assert_eq!(renewed.user, session.user);
    assert_eq!(renewed.access_token, "access-2");
    assert_eq!(renewed.refresh_expires_at, datetime!(2026-01-09 00:00 UTC));
}

#[test]
fn validity_is_exclusive_at_expiry() {
    let session = Session::new(sample_user(), sample_grant());
    assert!(session.access_valid_at(datetime!(2026-01-01 00:59:59 UTC)));
    assert!(!session.access_valid_at(datetime!(2026-01-01 01:00 UTC)));
    assert!(!session.refresh_valid_at(datetime!(2026-01-08 00:00 UTC)));
}

#[test]
fn display_name_falls_back_to_email_local_part() {
    let mut user = sample_user();
    assert_eq!(user.display_name(), "Ayu Lestari");
    user.full_name = "  ".to_owned();
    assert_eq!(user.display_name(), "a");
}
