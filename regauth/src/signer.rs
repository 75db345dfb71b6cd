use crate::error::{AuthError, SecretError};
use crate::types::SharedSecret;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

//--------------------------------------------------------------------------------------------------
// HMAC-SHA256 over the token payload
//--------------------------------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Computes and checks token tags. The MAC is keyed once from the shared secret; every call
/// works on a clone of that keyed state, so a `Signer` can be shared freely between threads.
///
/// Only the [`SharedSecret`] is zeroed on drop. The keyed state here holds blocks derived from the
/// key and is not, so keep a single `Signer` for the life of the process.
#[derive(Clone)]
pub struct Signer {
    keyed: HmacSha256,
}

impl Signer {
    pub fn new(secret: &SharedSecret) -> Result<Self, SecretError> {
        let keyed =
            HmacSha256::new_from_slice(secret.expose()).map_err(|_| SecretError::KeyLength)?;
        Ok(Signer { keyed })
    }

    /// Lower-case hex HMAC of `payload`
    pub fn sign(&self, payload: &str) -> String {
        let mut mac = self.keyed.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Recomputes the tag for `payload` and compares it with `tag` in constant time
    pub fn verify(&self, payload: &str, tag: &str) -> Result<(), AuthError> {
        let expected = self.sign(payload);

        // ct_eq on slices of different lengths returns false without comparing contents
        if bool::from(expected.as_bytes().ct_eq(tag.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Signer(<redacted>)")
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
