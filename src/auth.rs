//! Credential models: redacted secrets, the stored credential pair, and login/refresh payloads.

pub mod credentials;
pub mod secret;

pub use credentials::*;
pub use secret::*;
