use crate::handler_proxy::SigningAccess;
use crate::response::{RegAuthError, TextResponse};
use crate::state::StateRef;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use regauth::{compute_expiry, issue_token, AuthError, IssueRequest};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info, warn};

//--------------------------------------------------------------------------------------------------
// Request type
//--------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct Request {
    pub username: String,
    pub accountname: String,
    pub access: String,
    /// Relative, e.g. "12h", "7d", "2w", "1m" or "1y"
    pub expiration: String,
}

//--------------------------------------------------------------------------------------------------
// Errors
//--------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub enum GenerateTokenError {
    InvalidExpiration,
    InvalidAccessLevel,
    InvalidClaim,
    ExpiryNotInFuture,
    TokenGenerationError,
}

impl From<AuthError> for GenerateTokenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidFormat => GenerateTokenError::InvalidExpiration,
            AuthError::InvalidAccessLevel => GenerateTokenError::InvalidAccessLevel,
            AuthError::InvalidClaim => GenerateTokenError::InvalidClaim,
            AuthError::TokenExpired => GenerateTokenError::ExpiryNotInFuture,
            _ => GenerateTokenError::TokenGenerationError,
        }
    }
}

impl RegAuthError for GenerateTokenError {
    fn response_data(&self) -> (StatusCode, &'static str, String) {
        match self {
            GenerateTokenError::InvalidExpiration => (
                StatusCode::BAD_REQUEST,
                "invalid_expiration",
                "Expiration must be a number followed by one of h, d, w, m or y".to_string(),
            ),
            GenerateTokenError::InvalidAccessLevel => (
                StatusCode::BAD_REQUEST,
                "invalid_access_level",
                "Access must be either read or read_write".to_string(),
            ),
            GenerateTokenError::InvalidClaim => (
                StatusCode::BAD_REQUEST,
                "invalid_claim",
                "Username and account name must be non-empty and must not contain ':'".to_string(),
            ),
            GenerateTokenError::ExpiryNotInFuture => (
                StatusCode::BAD_REQUEST,
                "expiry_not_in_future",
                "Expiration must be in the future".to_string(),
            ),
            GenerateTokenError::TokenGenerationError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_generation_error",
                "Error generating token".to_string(),
            ),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Handler
//--------------------------------------------------------------------------------------------------

pub async fn handler(
    signing_access: SigningAccess,
    State(state): State<StateRef>,
    Json(request): Json<Request>,
) -> TextResponse<GenerateTokenError> {
    let now = OffsetDateTime::now_utc();

    let expires_at = match compute_expiry(&request.expiration, now) {
        Ok(expires_at) => expires_at,
        Err(err) => {
            warn!(
                "Invalid expiration {:?} requested for {}: {}",
                request.expiration,
                request.username,
                err.code()
            );
            return Err(GenerateTokenError::from(err)).into();
        }
    };

    let issue_request = IssueRequest {
        username: &request.username,
        account: &request.accountname,
        access: &request.access,
        expires_at,
    };

    let signer = state.issuing_signer(signing_access);
    let token = match issue_token(&issue_request, signer, state.nonces(), now) {
        Ok(token) => token,
        Err(err) => {
            let err = GenerateTokenError::from(err);
            if let GenerateTokenError::TokenGenerationError = err {
                error!("Error generating token for {}", request.username);
            } else {
                warn!("Rejected token request for {}: {:?}", request.username, err);
            }
            return Err(err).into();
        }
    };

    info!(
        "Token issued for {} on account {} with {} access, expiring in {}",
        request.username, request.accountname, request.access, request.expiration
    );

    Ok(token.into_string()).into()
}

//--------------------------------------------------------------------------------------------------
