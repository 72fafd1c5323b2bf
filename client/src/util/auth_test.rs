use super::*;
use std::cell::RefCell;

use session::AuthStatus;

#[test]
fn router_navigator_replaces_history_entry() {
    let calls = RefCell::new(Vec::new());
    let navigator = RouterNavigator(|path: &str, options: NavigateOptions| {
        calls.borrow_mut().push((path.to_owned(), options.replace));
    });
    navigator.navigate("/login");
    assert_eq!(*calls.borrow(), vec![("/login".to_owned(), true)]);
}

#[test]
fn guard_through_router_navigator_redirects_signed_out_dashboard() {
    let calls = RefCell::new(Vec::new());
    let navigator = RouterNavigator(|path: &str, _: NavigateOptions| calls.borrow_mut().push(path.to_owned()));
    let state = AuthState { user: None, loading: false };

    RouteGuard::default().enforce(Access::RequiresAuth, state.status(), &navigator);
    assert_eq!(*calls.borrow(), vec!["/login".to_owned()]);
}

#[test]
fn guard_waits_while_loading() {
    let calls = RefCell::new(Vec::<String>::new());
    let navigator = RouterNavigator(|path: &str, _: NavigateOptions| calls.borrow_mut().push(path.to_owned()));

    RouteGuard::default().enforce(Access::RequiresAuth, AuthStatus::Loading, &navigator);
    RouteGuard::default().enforce(Access::Entry, AuthState::default().status(), &navigator);
    assert!(calls.borrow().is_empty());
}
