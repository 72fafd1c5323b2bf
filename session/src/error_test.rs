use super::*;

fn api_error(status: u16) -> ApiError {
    ApiError { status, message: "nope".to_owned(), details: None }
}

#[test]
fn transport_error_has_zero_status() {
    let err = ApiError::transport("connection refused");
    assert_eq!(err.status, 0);
    assert!(err.is_transport());
    assert!(!err.is_rejection());
}

#[test]
fn rejection_statuses_map_to_authentication() {
    for status in [400, 401, 403] {
        assert_eq!(
            AuthError::from(api_error(status)),
            AuthError::Authentication { message: "nope".to_owned() },
            "status {status}"
        );
    }
}

#[test]
fn transport_failure_maps_to_network() {
    assert_eq!(
        AuthError::from(ApiError::transport("offline")),
        AuthError::Network("offline".to_owned())
    );
}

#[test]
fn server_failure_keeps_api_error() {
    assert_eq!(AuthError::from(api_error(503)), AuthError::Api(api_error(503)));
}

#[test]
fn api_error_display_includes_status() {
    assert_eq!(api_error(500).to_string(), "nope (status 500)");
}

#[test]
fn storage_error_converts_into_auth_error() {
    let err: AuthError = StorageError::Unavailable("quota".to_owned()).into();
    assert_eq!(err.to_string(), "storage unavailable: quota");
}
