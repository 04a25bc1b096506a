//! Authenticated identity of the client.

use crate::api::{AuthHeader, ShopApi};
use crate::error::ShopError;
use crate::listeners::{Listeners, SubscriptionId};
use crate::models::{AuthResponse, User};
use crate::token::TokenFile;
use std::rc::Rc;

/// The client's belief about who is signed in.
///
/// A user is present exactly when a verified token is held; the only way to
/// build an authenticated session is from a token plus the user the backend
/// returned for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    fn authenticated(token: String, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn auth_header(&self) -> AuthHeader {
        self.token
            .as_deref()
            .map(AuthHeader::bearer)
            .unwrap_or_else(AuthHeader::none)
    }
}

pub struct SessionStore {
    api: Rc<dyn ShopApi>,
    tokens: TokenFile,
    session: Session,
    loading: bool,
    verified: bool,
    listeners: Listeners<Session>,
}

impl SessionStore {
    pub fn new(api: Rc<dyn ShopApi>, tokens: TokenFile) -> Self {
        Self {
            api,
            tokens,
            session: Session::anonymous(),
            loading: true,
            verified: false,
            listeners: Listeners::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// True until startup verification has finished
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn subscribe(&mut self, callback: impl Fn(&Session) + 'static) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    #[allow(dead_code)] // For future views that close before the store does
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Restore the session from the stored token. Runs once per process;
    /// every failure falls back to anonymous and drops the stored token.
    pub fn verify(&mut self) {
        if self.verified {
            return;
        }
        self.verified = true;

        match self.tokens.load() {
            None => {
                tracing::debug!("no stored token, starting anonymous");
                self.session = Session::anonymous();
            }
            Some(token) => match self.api.current_user(&AuthHeader::bearer(&token)) {
                Ok(user) => {
                    tracing::info!(user = %user.email, "session restored");
                    self.session = Session::authenticated(token, user);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not fetch current user, continuing signed out");
                    self.forget_token();
                    self.session = Session::anonymous();
                }
            },
        }

        self.loading = false;
        self.listeners.notify(&self.session);
    }

    /// On failure the previous session is left untouched
    pub fn login(&mut self, email: &str, password: &str) -> Result<User, ShopError> {
        let resp = self.api.login(email, password)?;
        Ok(self.establish(resp))
    }

    /// Creates the account server-side, then signs in as it
    pub fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User, ShopError> {
        let resp = self.api.register(email, password, name)?;
        Ok(self.establish(resp))
    }

    /// Purely local: drops the token and the user
    pub fn logout(&mut self) {
        self.forget_token();
        self.session = Session::anonymous();
        tracing::info!("signed out");
        self.listeners.notify(&self.session);
    }

    fn establish(&mut self, resp: AuthResponse) -> User {
        if let Err(e) = self.tokens.save(&resp.access_token) {
            tracing::warn!(error = %e, "failed to persist token");
        }
        let user = resp.user;
        tracing::info!(user = %user.email, token_type = ?resp.token_type, "signed in");
        self.session = Session::authenticated(resp.access_token, user.clone());
        self.loading = false;
        self.listeners.notify(&self.session);
        user
    }

    fn forget_token(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to remove stored token");
        }
    }
}
