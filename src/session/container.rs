//! Authenticated, persisted state containers for the cart and the wishlist.
//!
//! A container owns one reducer state plus the collaborators it needs: the
//! current [`AuthStatus`], a [`SnapshotStore`] and a [`Navigator`]. Every
//! mutation goes through [`StateContainer::dispatch`]:
//! gate check → pure reduce → full snapshot write.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use crate::domain::aggregates::{CartCommand, CartEntry, CartState, CartTotals, ProductSnapshot, WishlistCommand, WishlistState};
use crate::session::auth::{AuthGate, AuthStatus, GateDecision, LoginRedirect, Navigator};
use crate::session::storage::{storage_key, SnapshotStore};

/// State with a pure transition function that can be persisted as a list.
pub trait Reducer: Clone + Default + PartialEq {
    type Command;
    type Item: Serialize + DeserializeOwned;
    /// Storage key prefix.
    const SCOPE: &'static str;
    /// Page the user returns to after signing in.
    const RETURN_PATH: &'static str;

    fn reduce(&self, command: Self::Command) -> Self;
    fn items(&self) -> &[Self::Item];
    fn load(items: Vec<Self::Item>) -> Self::Command;
}

impl Reducer for CartState {
    type Command = CartCommand;
    type Item = CartEntry;
    const SCOPE: &'static str = "cart";
    const RETURN_PATH: &'static str = "/user/cart";

    fn reduce(&self, command: CartCommand) -> Self { CartState::reduce(self, command) }
    fn items(&self) -> &[CartEntry] { CartState::items(self) }
    fn load(items: Vec<CartEntry>) -> CartCommand { CartCommand::Load { items } }
}

impl Reducer for WishlistState {
    type Command = WishlistCommand;
    type Item = ProductSnapshot;
    const SCOPE: &'static str = "wishlist";
    const RETURN_PATH: &'static str = "/user/wishlist";

    fn reduce(&self, command: WishlistCommand) -> Self { WishlistState::reduce(self, command) }
    fn items(&self) -> &[ProductSnapshot] { WishlistState::items(self) }
    fn load(items: Vec<ProductSnapshot>) -> WishlistCommand { WishlistCommand::Load(items) }
}

/// What happened to a mutation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Authenticated, but the state did not change (e.g. out of stock). Nothing is written.
    Ignored,
    /// Session still loading; nothing happened.
    Pending,
    /// Not signed in; nothing happened and a login redirect was requested.
    RedirectedToLogin(LoginRedirect),
}

impl Outcome {
    pub fn is_applied(&self) -> bool { matches!(self, Self::Applied) }
}

pub struct StateContainer<S: Reducer> {
    status: AuthStatus,
    hydrated_for: Option<String>,
    state: S,
    gate: AuthGate,
    store: SnapshotStore,
    navigator: Arc<dyn Navigator>,
}

pub type CartContainer = StateContainer<CartState>;
pub type WishlistContainer = StateContainer<WishlistState>;

impl<S: Reducer> StateContainer<S> {
    pub fn new(status: AuthStatus, store: SnapshotStore, navigator: Arc<dyn Navigator>) -> Self {
        let mut container = Self {
            status: AuthStatus::Loading, hydrated_for: None, state: S::default(),
            gate: AuthGate::new(S::RETURN_PATH), store, navigator,
        };
        container.set_auth_status(status);
        container
    }

    pub fn status(&self) -> &AuthStatus { &self.status }
    pub fn is_authenticated(&self) -> bool { self.status.is_authenticated() }

    /// Live state. Empty whenever no account is signed in.
    pub fn state(&self) -> &S { &self.state }

    /// Applies an identity provider transition.
    ///
    /// Signing in hydrates once per account. Signing out wipes the live state
    /// and leaves the stored record for the next login.
    pub fn set_auth_status(&mut self, status: AuthStatus) {
        match &status {
            AuthStatus::Authenticated(identity) if self.hydrated_for.as_deref() != Some(identity.account_id.as_str()) => {
                let key = storage_key(S::SCOPE, &identity.account_id);
                let items = self.store.load::<S::Item>(&key);
                info!(scope = S::SCOPE, key = %key, items = items.len(), "hydrated saved state");
                self.state = S::default().reduce(S::load(items));
                self.hydrated_for = Some(identity.account_id.clone());
            }
            AuthStatus::Authenticated(_) | AuthStatus::Loading => {}
            AuthStatus::Unauthenticated => {
                if self.hydrated_for.take().is_some() { info!(scope = S::SCOPE, "signed out, clearing live state"); }
                self.state = S::default();
            }
        }
        self.status = status;
    }

    pub fn dispatch(&mut self, command: S::Command) -> Outcome {
        match self.gate.check(&self.status) {
            GateDecision::Allow(identity) => {
                let next = self.state.reduce(command);
                if next == self.state {
                    debug!(scope = S::SCOPE, "mutation changed nothing");
                    return Outcome::Ignored;
                }
                self.state = next;
                self.store.save(&storage_key(S::SCOPE, &identity.account_id), self.state.items());
                Outcome::Applied
            }
            GateDecision::Wait => {
                debug!(scope = S::SCOPE, "session loading, mutation skipped");
                Outcome::Pending
            }
            GateDecision::Redirect(redirect) => {
                info!(scope = S::SCOPE, url = %redirect.url(), "login required");
                self.navigator.request_redirect(&redirect);
                Outcome::RedirectedToLogin(redirect)
            }
        }
    }
}

impl StateContainer<CartState> {
    pub fn add(&mut self, product: ProductSnapshot, quantity: u32) -> Outcome { self.dispatch(CartCommand::Add { product, quantity }) }
    pub fn add_one(&mut self, product: ProductSnapshot) -> Outcome { self.add(product, 1) }
    pub fn remove(&mut self, product_id: &str) -> Outcome { self.dispatch(CartCommand::Remove { product_id: product_id.to_string() }) }

    /// A quantity of zero or less removes the entry.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Outcome {
        if quantity <= 0 { return self.remove(product_id); }
        self.dispatch(CartCommand::SetQuantity { product_id: product_id.to_string(), quantity })
    }
    pub fn clear(&mut self) -> Outcome { self.dispatch(CartCommand::Clear) }

    pub fn contains(&self, product_id: &str) -> bool { self.is_authenticated() && self.state.contains(product_id) }
    pub fn get(&self, product_id: &str) -> Option<&CartEntry> {
        if !self.is_authenticated() { return None; }
        self.state.get(product_id)
    }
    pub fn totals(&self) -> CartTotals { self.state.totals() }
}

impl StateContainer<WishlistState> {
    pub fn add(&mut self, product: ProductSnapshot) -> Outcome { self.dispatch(WishlistCommand::Add(product)) }
    pub fn remove(&mut self, product_id: &str) -> Outcome { self.dispatch(WishlistCommand::Remove(product_id.to_string())) }
    pub fn clear(&mut self) -> Outcome { self.dispatch(WishlistCommand::Clear) }
    pub fn contains(&self, product_id: &str) -> bool { self.is_authenticated() && self.state.contains(product_id) }

    pub fn toggle(&mut self, product: ProductSnapshot) -> Outcome {
        if self.contains(&product.id) { self.remove(&product.id) } else { self.add(product) }
    }
}
