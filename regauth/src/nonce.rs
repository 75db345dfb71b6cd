use crate::types::{Nonce, NONCE_LENGTH};
use rand::distributions::Alphanumeric;
use rand::Rng;

//--------------------------------------------------------------------------------------------------
// Source of per-token nonces
//--------------------------------------------------------------------------------------------------

pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> Nonce;
}

/// Draws from the thread-local CSPRNG, so concurrent issuers never contend on a shared generator
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNonce;

impl NonceSource for RandomNonce {
    fn next_nonce(&self) -> Nonce {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        Nonce::from_verified(&nonce)
    }
}

/// Always hands out the same nonce, making issued tokens byte-for-byte reproducible
#[derive(Clone, Debug)]
pub struct FixedNonce(Nonce);

impl FixedNonce {
    pub fn new(nonce: Nonce) -> Self {
        FixedNonce(nonce)
    }
}

impl NonceSource for FixedNonce {
    fn next_nonce(&self) -> Nonce {
        self.0.clone()
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
