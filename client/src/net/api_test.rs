use super::*;
use session::api::Method;

fn request() -> HttpRequest {
    HttpRequest { method: Method::Post, path: "/api/auth/login".to_owned(), body: None, authorization: None }
}

#[test]
fn unavailable_message_names_request() {
    assert_eq!(unavailable_message(&request()), "POST /api/auth/login: fetch is only available in the browser");
}

#[cfg(not(feature = "csr"))]
#[test]
fn native_transport_reports_transport_failure() {
    let err = futures::executor::block_on(FetchTransport.send(request())).unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.message, unavailable_message(&request()));
}
