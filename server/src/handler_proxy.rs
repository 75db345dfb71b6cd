use crate::handlers::generate_token::{GenerateTokenError, Request};
use crate::handlers::{check_access, generate_token};
use crate::response::TextResponse;
use crate::state::StateRef;
use axum::extract::State;
use axum::Json;
use regauth::extract::{ForwardedRegistryAccess, RegistryAccess};

//--------------------------------------------------------------------------------------------------
// Types to represent permissions for the handlers
//--------------------------------------------------------------------------------------------------

#[allow(dead_code)]
pub struct SigningAccess(bool);

//--------------------------------------------------------------------------------------------------
// Re-export handlers, but grant handler access where applicable
//--------------------------------------------------------------------------------------------------

// generate_token issues tokens, so it is the only handler allowed to sign
pub async fn generate_token(
    state: State<StateRef>,
    request: Json<Request>,
) -> TextResponse<GenerateTokenError> {
    generate_token::handler(SigningAccess(true), state, request).await
}

//--------------------------------------------------------------------------------------------------

pub async fn check_access(access: RegistryAccess) -> &'static str {
    check_access::handler(access).await
}

pub async fn check_forwarded_access(access: ForwardedRegistryAccess) -> &'static str {
    check_access::forwarded_handler(access).await
}

//--------------------------------------------------------------------------------------------------
