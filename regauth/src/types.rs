use crate::error::{AuthError, SecretError};
use std::fmt::{Debug, Display};
use std::str::FromStr;
use zeroize::Zeroizing;

//--------------------------------------------------------------------------------------------------
// Claim values
//--------------------------------------------------------------------------------------------------

// Token fields are joined with "::" and never escaped. Basic auth usernames cannot contain ':'
// and neither can registry account names, so rejecting it keeps the split unambiguous.
fn validate_claim_field(value: &str) -> Result<(), AuthError> {
    if value.is_empty() || value.contains(':') {
        return Err(AuthError::InvalidClaim);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(username: &str) -> Result<Self, AuthError> {
        validate_claim_field(username)?;
        Ok(Username(username.to_string()))
    }

    pub(crate) fn from_verified(username: &str) -> Self {
        Username(username.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(account: &str) -> Result<Self, AuthError> {
        validate_claim_field(account)?;
        Ok(AccountName(account.to_string()))
    }

    pub(crate) fn from_verified(account: &str) -> Self {
        AccountName(account.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------------------------------------------------------------------
// Access level
//--------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Read,
    ReadWrite,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Read => "read",
            AccessLevel::ReadWrite => "read_write",
        }
    }

    pub fn allows_write(&self) -> bool {
        matches!(self, AccessLevel::ReadWrite)
    }
}

impl FromStr for AccessLevel {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(AccessLevel::Read),
            "read_write" => Ok(AccessLevel::ReadWrite),
            _ => Err(AuthError::InvalidAccessLevel),
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//--------------------------------------------------------------------------------------------------
// Nonce
//--------------------------------------------------------------------------------------------------

pub const NONCE_LENGTH: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce(String);

impl Nonce {
    /// Accepts exactly `NONCE_LENGTH` ASCII alphanumeric characters
    pub fn new(nonce: &str) -> Option<Self> {
        if nonce.len() == NONCE_LENGTH && nonce.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Nonce(nonce.to_string()))
        } else {
            None
        }
    }

    // Only for fields already covered by a verified MAC
    pub(crate) fn from_verified(nonce: &str) -> Self {
        Nonce(nonce.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------------------------------------------------------------------
// Shared secret
//--------------------------------------------------------------------------------------------------

/// Process-wide signing secret. Read once at startup and handed to [`crate::Signer`]; the bytes
/// are never printed and are zeroed when the value is dropped.
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(SharedSecret(secret))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
