use crate::error::AuthError;
use crate::internal::timestamp::ExpiryTimestamp;
use crate::{AccessLevel, AccountName, Nonce, Username};
use time::OffsetDateTime;

//--------------------------------------------------------------------------------------------------
// Token claims
//--------------------------------------------------------------------------------------------------

pub(crate) const DELIMITER: &str = "::";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenClaims {
    username: Username,
    account: AccountName,
    access: AccessLevel,
    expires_at: ExpiryTimestamp,
    nonce: Nonce,
}

impl TokenClaims {
    pub(crate) fn new(
        username: Username,
        account: AccountName,
        access: AccessLevel,
        expires_at: OffsetDateTime,
        nonce: Nonce,
    ) -> Self {
        TokenClaims {
            username,
            account,
            access,
            expires_at: ExpiryTimestamp::new(expires_at),
            nonce,
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn account(&self) -> &AccountName {
        &self.account
    }

    pub fn access(&self) -> AccessLevel {
        self.access
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at.into()
    }

    pub fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// The signed part of the token: every field except the MAC, in wire order
    pub(crate) fn payload(&self) -> Result<String, AuthError> {
        let expires_at = self.expires_at.format()?;
        Ok([
            self.username.as_str(),
            self.account.as_str(),
            self.access.as_str(),
            expires_at.as_str(),
            self.nonce.as_str(),
        ]
        .join(DELIMITER))
    }
}

//--------------------------------------------------------------------------------------------------
// Decoded but not yet verified fields
//--------------------------------------------------------------------------------------------------

pub(crate) struct RawToken<'a> {
    pub(crate) payload: &'a str,
    pub(crate) tag: &'a str,
    username: &'a str,
    account: &'a str,
    access: AccessLevel,
    expires_at: ExpiryTimestamp,
    nonce: &'a str,
}

impl<'a> RawToken<'a> {
    pub(crate) fn split(decoded: &'a str) -> Result<Self, AuthError> {
        let fields: Vec<&str> = decoded.split(DELIMITER).collect();
        let &[username, account, access, expires_at, nonce, tag] = fields.as_slice() else {
            return Err(AuthError::MalformedToken);
        };

        // The payload is everything before the last delimiter
        let payload = &decoded[..decoded.len() - tag.len() - DELIMITER.len()];

        Ok(RawToken {
            payload,
            tag,
            username,
            account,
            access: access.parse().map_err(|_| AuthError::MalformedToken)?,
            expires_at: ExpiryTimestamp::parse(expires_at)?,
            nonce,
        })
    }

    pub(crate) fn expiry(&self) -> ExpiryTimestamp {
        self.expires_at
    }

    /// Only call once the MAC over `payload` has been checked
    pub(crate) fn into_claims(self) -> TokenClaims {
        TokenClaims {
            username: Username::from_verified(self.username),
            account: AccountName::from_verified(self.account),
            access: self.access,
            expires_at: self.expires_at,
            nonce: Nonce::from_verified(self.nonce),
        }
    }
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn claims() -> TokenClaims {
        TokenClaims::new(
            Username::new("alice").unwrap(),
            AccountName::new("acme").unwrap(),
            AccessLevel::ReadWrite,
            datetime!(2030-05-01 12:00:00.123 UTC),
            Nonce::new("a1B2c").unwrap(),
        )
    }

    #[test]
    fn payload_joins_fields_in_wire_order() {
        assert_eq!(
            claims().payload().unwrap(),
            "alice::acme::read_write::2030-05-01T12:00:00Z::a1B2c"
        );
    }

    #[test]
    fn split_separates_payload_and_tag() {
        let decoded = "alice::acme::read::2030-05-01T12:00:00Z::a1B2c::deadbeef";
        let raw = RawToken::split(decoded).unwrap();
        assert_eq!(raw.payload, "alice::acme::read::2030-05-01T12:00:00Z::a1B2c");
        assert_eq!(raw.tag, "deadbeef");

        let claims = raw.into_claims();
        assert_eq!(claims.username().as_str(), "alice");
        assert_eq!(claims.access(), AccessLevel::Read);
    }

    #[test]
    fn split_rejects_wrong_field_count() {
        for decoded in [
            "alice::acme::read::2030-05-01T12:00:00Z::a1B2c",
            "alice::acme::read::2030-05-01T12:00:00Z::a1B2c::dead::beef",
            "",
        ] {
            assert_eq!(RawToken::split(decoded).err(), Some(AuthError::MalformedToken));
        }
    }

    #[test]
    fn split_rejects_bad_access_and_timestamp() {
        let bad_access = "alice::acme::admin::2030-05-01T12:00:00Z::a1B2c::00";
        assert_eq!(RawToken::split(bad_access).err(), Some(AuthError::MalformedToken));

        let bad_time = "alice::acme::read::tomorrow::a1B2c::00";
        assert_eq!(RawToken::split(bad_time).err(), Some(AuthError::MalformedToken));
    }
}

//--------------------------------------------------------------------------------------------------
