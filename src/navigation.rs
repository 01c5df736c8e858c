//! Navigation hook fired when authentication is irrecoverably lost.

/// Sends the user back to the sign-in screen.
///
/// The client calls [`LoginRedirect::redirect_to_login`] exactly once per call that ends
/// unauthenticated, and on explicit logout. Closures implement the trait directly:
///
/// ```
/// use tokkatot_client::navigation::LoginRedirect;
///
/// let redirect = || eprintln!("Session expired, please sign in again.");
///
/// redirect.redirect_to_login();
/// ```
pub trait LoginRedirect
where
	Self: Send + Sync,
{
	/// Performs the redirect side effect.
	fn redirect_to_login(&self);
}
impl<F> LoginRedirect for F
where
	F: Fn() + Send + Sync,
{
	fn redirect_to_login(&self) {
		self()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;

	#[test]
	fn closures_act_as_redirects() {
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = hits.clone();
		let redirect: Arc<dyn LoginRedirect> = Arc::new(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		});

		redirect.redirect_to_login();

		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}
}
