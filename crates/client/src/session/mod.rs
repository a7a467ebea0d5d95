//! Cookie-session client for login and user-scoped documents.
//!
//! A [`SessionClient`] owns its own transport: its requests never carry the
//! API key, and the API-key client never sees its cookies. Lookups that need
//! service-level access (phone to email, customer by email) go through the
//! [`ErpClient`] it was opened from.

mod wishlist;

use std::sync::Arc;

use erp_storefront_core::LoginIdentifier;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::client::ErpClient;
use crate::docs::{USER, UserDoc};
use crate::error::{AuthFailure, ErpError, Result, classify_auth_failure};
use crate::transport::Transport;
use crate::types::UserSession;

/// User id Frappe reports for a request without a session.
const GUEST_USER: &str = "Guest";

#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<SessionClientInner>,
}

struct SessionClientInner {
    transport: Transport,
    erp: ErpClient,
}

impl SessionClient {
    pub(crate) fn new(erp: ErpClient) -> Result<Self> {
        let transport = Transport::session(erp.config())?;
        Ok(Self {
            inner: Arc::new(SessionClientInner { transport, erp }),
        })
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    /// Sign in with an email address or a phone number.
    ///
    /// After the login call succeeds, the identity and the linked customer
    /// are looked up best-effort; a failed lookup only leaves the
    /// corresponding field empty.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::Auth` with the classified reason if the server
    /// rejects the login or cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &SecretString) -> Result<UserSession> {
        let identifier = LoginIdentifier::parse(identifier).map_err(|e| {
            debug!(error = %e, "Rejected login identifier");
            ErpError::Auth(AuthFailure::InvalidCredentials)
        })?;
        let usr = self.login_user(&identifier).await;

        let response = self
            .transport()
            .call_post("login", &json!({"usr": usr, "pwd": password.expose_secret()}))
            .await
            .map_err(|e| {
                let failure = classify_auth_failure(&e);
                warn!(error = %e, ?failure, "Login failed");
                ErpError::Auth(failure)
            })?;
        let login_full_name = response
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string);

        let user = match self.logged_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Could not confirm session identity");
                usr
            }
        };

        let display_name = match self.full_name(&user).await {
            Ok(name) => name.or(login_full_name),
            Err(e) => {
                warn!(error = %e, "Could not load user profile");
                login_full_name
            }
        };

        let customer = match self.inner.erp.find_customer_by_email(&user).await {
            Ok(customer) => customer,
            Err(e) => {
                warn!(error = %e, "Could not resolve customer for user");
                None
            }
        };

        debug!(%user, has_customer = customer.is_some(), "Logged in");
        Ok(UserSession {
            user,
            display_name,
            customer,
        })
    }

    /// End the server session.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout call fails.
    pub async fn logout(&self) -> Result<()> {
        self.transport().call_post("logout", &json!({})).await?;
        Ok(())
    }

    /// User id of the current session.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::Auth` if the session is not logged in.
    pub async fn logged_user(&self) -> Result<String> {
        let user: String = self
            .transport()
            .call_get("frappe.auth.get_logged_user", &[])
            .await?;
        if user == GUEST_USER {
            return Err(ErpError::Auth(AuthFailure::InvalidCredentials));
        }
        Ok(user)
    }

    async fn full_name(&self, user: &str) -> Result<Option<String>> {
        let doc: UserDoc = self.transport().get_doc(USER, user).await?;
        Ok(doc.full_name)
    }

    /// The `usr` to send: the email itself, or the email behind a phone
    /// number. An unknown phone number is sent as typed and left to the
    /// server to reject.
    async fn login_user(&self, identifier: &LoginIdentifier) -> String {
        let phone = match identifier {
            LoginIdentifier::Email(email) => return email.as_str().to_string(),
            LoginIdentifier::Phone(phone) => phone,
        };

        match self.inner.erp.find_email_by_phone(phone).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                debug!("No user with this phone number");
                phone.clone()
            }
            Err(e) => {
                warn!(error = %e, "Phone lookup failed");
                phone.clone()
            }
        }
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("erp", &self.inner.erp)
            .finish_non_exhaustive()
    }
}
