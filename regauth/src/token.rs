use crate::error::AuthError;
use crate::internal::claims::{RawToken, TokenClaims, DELIMITER};
use crate::internal::timestamp::ExpiryTimestamp;
use crate::nonce::NonceSource;
use crate::signer::Signer;
use crate::{AccessLevel, AccountName, Username};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::{Debug, Display};
use time::OffsetDateTime;
use tracing::{debug, warn};

//--------------------------------------------------------------------------------------------------
// Access token
//--------------------------------------------------------------------------------------------------

/// Base64 of `username::account::access::expiry::nonce::hex(mac)`.
///
/// The token is a bearer credential, so `Debug` does not print it. Use [`AccessToken::as_str`] or
/// `Display` to hand it to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

//--------------------------------------------------------------------------------------------------
// Issuing
//--------------------------------------------------------------------------------------------------

/// What a caller asks to be put in a new token. Fields are validated by [`issue_token`].
#[derive(Clone, Copy, Debug)]
pub struct IssueRequest<'a> {
    pub username: &'a str,
    pub account: &'a str,
    pub access: &'a str,
    pub expires_at: OffsetDateTime,
}

pub fn issue_token<N>(
    request: &IssueRequest<'_>,
    signer: &Signer,
    nonces: &N,
    now: OffsetDateTime,
) -> Result<AccessToken, AuthError>
where
    N: NonceSource + ?Sized,
{
    let access: AccessLevel = request.access.parse()?;
    let username = Username::new(request.username)?;
    let account = AccountName::new(request.account)?;

    // The wire form has second precision, so check what will actually be written
    if ExpiryTimestamp::new(request.expires_at).has_passed(now) {
        warn!("Refusing to issue a token for {} that is already expired", username);
        return Err(AuthError::TokenExpired);
    }

    let nonce = nonces.next_nonce();
    let claims = TokenClaims::new(username, account, access, request.expires_at, nonce);
    let payload = claims.payload()?;
    let tag = signer.sign(&payload);

    debug!(
        "Issued {} token for {} on account {}",
        claims.access(),
        claims.username(),
        claims.account()
    );

    Ok(AccessToken(STANDARD.encode(format!("{payload}{DELIMITER}{tag}"))))
}

//--------------------------------------------------------------------------------------------------
// Verifying
//--------------------------------------------------------------------------------------------------

/// Decodes `token`, checks its MAC and then its expiry.
///
/// The order is deliberately MAC first, expiry second. Nothing derived from an unauthenticated
/// token decides the outcome: a tampered token always fails with `MalformedToken` or
/// `InvalidSignature`, and only genuine tokens can report `TokenExpired`. For untampered tokens
/// the result is the same whichever check runs first.
pub fn verify_token(
    token: &str,
    signer: &Signer,
    now: OffsetDateTime,
) -> Result<TokenClaims, AuthError> {
    let decoded = STANDARD
        .decode(token)
        .map_err(|_| AuthError::MalformedToken)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedToken)?;

    let raw = RawToken::split(&decoded)?;
    signer.verify(raw.payload, raw.tag)?;

    if raw.expiry().has_passed(now) {
        return Err(AuthError::TokenExpired);
    }

    Ok(raw.into_claims())
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
