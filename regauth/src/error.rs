use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Failure kinds for issuing, verifying and authorizing tokens
//--------------------------------------------------------------------------------------------------

/// Every failure is terminal for the call that produced it. Verification and authorization are
/// deterministic, so retrying with the same inputs yields the same error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthError {
    /// The relative expiration string does not follow `<digits><h|d|w|m|y>`
    #[error("invalid expiration format")]
    InvalidFormat,

    /// Access level is neither `read` nor `read_write`
    #[error("access level must be either read or read_write")]
    InvalidAccessLevel,

    /// A username or account name cannot be carried by the token format
    #[error("username and account name must be non-empty and must not contain ':'")]
    InvalidClaim,

    #[error("malformed token")]
    MalformedToken,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token signature")]
    InvalidSignature,

    /// The requested path is neither the registry root nor a blob/manifest path
    #[error("path is not a registry blob or manifest path")]
    InvalidPath,

    /// The token was issued to another user or for another account
    #[error("token does not grant access to this account")]
    Unauthorized,

    /// A read-only token was presented for a write operation
    #[error("token does not grant write access")]
    InsufficientAccess,
}

impl AuthError {
    /// Stable identifier, safe to log and to put in responses
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidFormat => "invalid_format",
            AuthError::InvalidAccessLevel => "invalid_access_level",
            AuthError::InvalidClaim => "invalid_claim",
            AuthError::MalformedToken => "malformed_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::InvalidPath => "invalid_path",
            AuthError::Unauthorized => "unauthorized",
            AuthError::InsufficientAccess => "insufficient_access",
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Startup failures building the signer
//--------------------------------------------------------------------------------------------------

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretError {
    #[error("shared secret must not be empty")]
    Empty,

    #[error("shared secret has a length the MAC does not accept")]
    KeyLength,
}

//--------------------------------------------------------------------------------------------------
