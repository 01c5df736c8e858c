//! Session helpers: sign-in, sign-out, authentication checks, and farm/coop selection.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, TokenGrant},
	client::{ApiClient, RequestOptions},
	envelope::ResponseEnvelope,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::Selection,
};

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Signs in and stores the issued access + refresh tokens.
	///
	/// The call carries no `Authorization` header and skips the 401 refresh flow; a rejected
	/// sign-in is returned as a normal `success: false` envelope.
	pub async fn login(&self, credentials: &LoginRequest) -> Result<ResponseEnvelope> {
		const KIND: CallKind = CallKind::Login;

		let span = CallSpan::new(KIND, &Method::POST, &self.config.login_path);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result: Result<ResponseEnvelope> = span
			.instrument(async {
				let url = self.config.login_url()?;
				let options = RequestOptions::new(Method::POST).json(credentials)?;
				let response = self.send(self.build_request(&url, &options, None)?).await?;

				span.record_status(response.status);
				obs::record_response_status(KIND, response.status);
				let envelope = ResponseEnvelope::from_response(&response);

				if !envelope.success {
					span.note("sign-in rejected");

					return Ok(envelope);
				}

				let grant =
					envelope.data_as::<TokenGrant>().ok().filter(TokenGrant::has_access_token);

				if let Some(grant) = grant {
					self.store.set_access_token(grant.access_token.clone()).await?;

					if let Some(refresh_token) = grant.issued_refresh_token() {
						self.store.set_refresh_token(refresh_token.clone()).await?;
					}
				} else {
					span.note("sign-in succeeded without issuing tokens");
				}

				Ok(envelope)
			})
			.await;

		match &result {
			Ok(envelope) if envelope.success => obs::record_call_outcome(KIND, CallOutcome::Success),
			_ => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Returns `true` when an access token is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store.access_token().await?.is_some())
	}

	/// Like [`ApiClient::is_authenticated`], but fires the login redirect when no access token is
	/// stored.
	pub async fn require_auth(&self) -> Result<bool> {
		let authenticated = self.is_authenticated().await?;

		if !authenticated {
			self.redirect.redirect_to_login();
		}

		Ok(authenticated)
	}

	/// Clears the tokens and the farm/coop selection, then fires the login redirect.
	///
	/// The redirect fires even if the store fails; the first store error is returned afterwards.
	pub async fn logout(&self) -> Result<()> {
		let cleared = self.store.clear_all().await;
		let deselected = self.store.clear_selection().await;

		self.redirect.redirect_to_login();

		cleared?;
		deselected?;

		Ok(())
	}

	/// Currently selected farm identifier.
	pub async fn selected_farm_id(&self) -> Result<Option<String>> {
		Ok(self.store.selection().await?.farm_id)
	}

	/// Selects a farm.
	pub async fn set_selected_farm_id(&self, id: impl Display) -> Result<()> {
		let mut selection = self.store.selection().await?;

		selection.farm_id = Some(id.to_string());

		Ok(self.store.save_selection(selection).await?)
	}

	/// Currently selected coop identifier.
	pub async fn selected_coop_id(&self) -> Result<Option<String>> {
		Ok(self.store.selection().await?.coop_id)
	}

	/// Selects a coop.
	pub async fn set_selected_coop_id(&self, id: impl Display) -> Result<()> {
		let mut selection = self.store.selection().await?;

		selection.coop_id = Some(id.to_string());

		Ok(self.store.save_selection(selection).await?)
	}

	/// Current farm/coop selection.
	pub async fn selection(&self) -> Result<Selection> {
		Ok(self.store.selection().await?)
	}
}
