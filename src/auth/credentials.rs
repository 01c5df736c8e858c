//! Stored credential pair plus the payloads exchanged with the login and refresh endpoints.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access + refresh token slots owned by a [`CredentialStore`](crate::store::CredentialStore).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential sent with each request.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<TokenSecret>,
	/// Longer-lived credential exchanged for a new access token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
}
impl CredentialPair {
	/// Builds a pair holding both tokens.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: Some(TokenSecret::new(access_token)),
			refresh_token: Some(TokenSecret::new(refresh_token)),
		}
	}

	/// Builds a pair that only carries an access token.
	pub fn access_only(access_token: impl Into<String>) -> Self {
		Self { access_token: Some(TokenSecret::new(access_token)), refresh_token: None }
	}

	/// Returns `true` when neither slot holds a token.
	pub fn is_empty(&self) -> bool {
		self.access_token.is_none() && self.refresh_token.is_none()
	}
}

/// Body posted to the token-exchange endpoint.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
	pub(crate) refresh_token: &'a str,
}

/// Token material carried in the `data` member of login and refresh envelopes.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenGrant {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Rotated refresh token, when the server issues one.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Access token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
}
impl TokenGrant {
	/// Returns `true` when the grant carries a non-empty access token.
	pub fn has_access_token(&self) -> bool {
		!self.access_token.expose().is_empty()
	}

	/// Returns the issued (or rotated) refresh token, ignoring empty values.
	pub fn issued_refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref().filter(|secret| !secret.expose().is_empty())
	}
}

/// Sign-in payload accepted by the login endpoint; either an email or a phone number is required.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	email: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	phone: Option<String>,
	password: String,
}
impl LoginRequest {
	/// Signs in with an email address.
	pub fn with_email(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: Some(email.into()), phone: None, password: password.into() }
	}

	/// Signs in with a phone number.
	pub fn with_phone(phone: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: None, phone: Some(phone.into()), password: password.into() }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("phone", &self.phone)
			.field("password", &"<redacted>")
			.finish()
	}
}
