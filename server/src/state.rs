use crate::handler_proxy::SigningAccess;
use regauth::extract::SignerProvider;
use regauth::{NonceSource, RandomNonce, Signer};
use std::sync::Arc;

//--------------------------------------------------------------------------------------------------
// State given to the handlers
//--------------------------------------------------------------------------------------------------

pub type StateRef = Arc<State>;

pub struct State {
    signer: Signer,
    nonces: Box<dyn NonceSource>,
}

impl State {
    pub fn new(signer: Signer) -> Self {
        Self::with_nonce_source(signer, Box::new(RandomNonce))
    }

    pub(crate) fn with_nonce_source(signer: Signer, nonces: Box<dyn NonceSource>) -> Self {
        Self { signer, nonces }
    }

    // Verification goes through SignerProvider; issuing needs the proxy's permission
    pub fn issuing_signer(&self, _signing_access: SigningAccess) -> &Signer {
        &self.signer
    }

    pub fn nonces(&self) -> &dyn NonceSource {
        self.nonces.as_ref()
    }
}

impl SignerProvider for State {
    fn signer(&self) -> &Signer {
        &self.signer
    }
}

//--------------------------------------------------------------------------------------------------
