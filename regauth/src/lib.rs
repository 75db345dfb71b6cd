//--------------------------------------------------------------------------------------------------

pub mod access;
mod error;
pub mod expiry;
#[cfg(feature = "axum-extract")]
pub mod extract;
mod internal;
mod nonce;
mod signer;
pub mod token;
mod types;

pub use access::{authorize, AccessRequest, Decision, RegistryPath};
pub use error::{AuthError, SecretError};
pub use expiry::{compute_expiry, ExpiryUnit, RelativeExpiry};
pub use internal::claims::TokenClaims;
pub use nonce::{FixedNonce, NonceSource, RandomNonce};
pub use signer::Signer;
pub use token::{issue_token, verify_token, AccessToken, IssueRequest};
pub use types::*;

//--------------------------------------------------------------------------------------------------
