//! Identity provider view and the login gate.
//!
//! The session core never performs navigation itself. When a mutation needs a
//! signed-in account it hands a [`LoginRedirect`] to the host's [`Navigator`].

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role { Admin, #[default] User }

/// Signed-in account as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable account id. Persistence is keyed on this, never on the email.
    pub account_id: String,
    pub email: Option<String>,
    pub role: Role,
}

impl Identity {
    pub fn new(account_id: impl Into<String>, role: Role) -> Self {
        Self { account_id: account_id.into(), email: None, role }
    }
    pub fn with_email(mut self, email: impl Into<String>) -> Self { self.email = Some(email.into()); self }
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthStatus {
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(Identity),
}

impl AuthStatus {
    pub fn identity(&self) -> Option<&Identity> {
        match self { Self::Authenticated(identity) => Some(identity), _ => None }
    }
    pub fn is_authenticated(&self) -> bool { self.identity().is_some() }
}

/// Where a freshly signed-in user lands. `None` while the provider is loading.
pub fn landing_path(status: &AuthStatus) -> Option<&'static str> {
    match status {
        AuthStatus::Loading => None,
        AuthStatus::Authenticated(id) if id.is_admin() => Some("/admin/dashboard"),
        AuthStatus::Authenticated(_) => Some("/user/dashboard"),
        AuthStatus::Unauthenticated => Some("/"),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginRedirect { pub return_path: String }

impl LoginRedirect {
    pub fn new(return_path: impl Into<String>) -> Self { Self { return_path: return_path.into() } }

    pub fn url(&self) -> String {
        let encoded: String = form_urlencoded::byte_serialize(self.return_path.as_bytes()).collect();
        format!("{LOGIN_PATH}?callbackUrl={encoded}")
    }
}

/// Host surface that performs redirects on behalf of the session core.
pub trait Navigator: Send + Sync {
    fn request_redirect(&self, redirect: &LoginRedirect);
}

/// Navigator that queues redirect requests for the host to drain.
#[derive(Debug, Default)]
pub struct RecordingNavigator { requests: Mutex<Vec<LoginRedirect>> }

impl RecordingNavigator {
    pub fn new() -> Self { Self::default() }
    pub fn take(&self) -> Vec<LoginRedirect> {
        self.requests.lock().map(|mut r| std::mem::take(&mut *r)).unwrap_or_default()
    }
    pub fn len(&self) -> usize { self.requests.lock().map(|r| r.len()).unwrap_or(0) }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Navigator for RecordingNavigator {
    fn request_redirect(&self, redirect: &LoginRedirect) {
        if let Ok(mut requests) = self.requests.lock() { requests.push(redirect.clone()); }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GateDecision<'a> {
    Allow(&'a Identity),
    /// Provider still resolving the session; do not mutate yet.
    Wait,
    Redirect(LoginRedirect),
}

/// Check-and-redirect wrapper applied before every mutation.
#[derive(Clone, Debug)]
pub struct AuthGate { return_path: String }

impl AuthGate {
    pub fn new(return_path: impl Into<String>) -> Self { Self { return_path: return_path.into() } }
    pub fn return_path(&self) -> &str { &self.return_path }

    pub fn check<'a>(&self, status: &'a AuthStatus) -> GateDecision<'a> {
        match status {
            AuthStatus::Authenticated(identity) => GateDecision::Allow(identity),
            AuthStatus::Loading => GateDecision::Wait,
            AuthStatus::Unauthenticated => GateDecision::Redirect(LoginRedirect::new(self.return_path.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_return_path() {
        assert_eq!(LoginRedirect::new("/user/cart").url(), "/auth/login?callbackUrl=%2Fuser%2Fcart");
    }

    #[test]
    fn test_gate_decisions() {
        let gate = AuthGate::new("/user/wishlist");
        let user = AuthStatus::Authenticated(Identity::new("u1", Role::User));
        assert!(matches!(gate.check(&user), GateDecision::Allow(id) if id.account_id == "u1"));
        assert_eq!(gate.check(&AuthStatus::Loading), GateDecision::Wait);
        assert_eq!(gate.check(&AuthStatus::Unauthenticated), GateDecision::Redirect(LoginRedirect::new("/user/wishlist")));
    }

    #[test]
    fn test_landing_path_by_role() {
        let admin = AuthStatus::Authenticated(Identity::new("a", Role::Admin));
        let user = AuthStatus::Authenticated(Identity::new("u", Role::User).with_email("u@example.com"));
        assert_eq!(landing_path(&admin), Some("/admin/dashboard"));
        assert_eq!(landing_path(&user), Some("/user/dashboard"));
        assert_eq!(landing_path(&AuthStatus::Unauthenticated), Some("/"));
        assert_eq!(landing_path(&AuthStatus::Loading), None);
    }

    #[test]
    fn test_recording_navigator_drains() {
        let nav = RecordingNavigator::new();
        nav.request_redirect(&LoginRedirect::new("/user/cart"));
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.take(), vec![LoginRedirect::new("/user/cart")]);
        assert!(nav.is_empty());
    }
}
