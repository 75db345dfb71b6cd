use crate::access::{authorize, AccessRequest, Decision};
use crate::signer::Signer;
use crate::AuthError;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json, RequestPartsExt};
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use axum_extra::TypedHeader;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, warn};

//--------------------------------------------------------------------------------------------------
// Trait for Axum states to comply with to provide the signer
//--------------------------------------------------------------------------------------------------

pub trait SignerProvider {
    fn signer(&self) -> &Signer;
}

impl<T: SignerProvider> SignerProvider for Arc<T> {
    fn signer(&self) -> &Signer {
        self.deref().signer()
    }
}

//--------------------------------------------------------------------------------------------------
// Extract Error
//--------------------------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum ExtractError {
    NoAuthorizationHeader,
    InvalidAuthorizationHeader,
    InvalidQuery,
    Denied(AuthError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

pub const BASIC_CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

// Registry clients only retry with credentials after a Basic challenge, and the body never says
// which check failed
impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, BASIC_CHALLENGE)],
            Json(ErrorResponse {
                code: "unauthorized",
                message: "Unauthorized".to_string(),
            }),
        )
            .into_response()
    }
}

//--------------------------------------------------------------------------------------------------
// Shared checks
//--------------------------------------------------------------------------------------------------

async fn basic_credentials(parts: &mut Parts) -> Result<Authorization<Basic>, ExtractError> {
    parts
        .extract::<TypedHeader<Authorization<Basic>>>()
        .await
        .map_err(|t| match t.reason() {
            TypedHeaderRejectionReason::Missing => {
                debug!("Request made with no Authorization header");
                ExtractError::NoAuthorizationHeader
            }
            _ => {
                warn!("Request made with an Authorization header that is not valid Basic auth");
                ExtractError::InvalidAuthorizationHeader
            }
        })
        .map(|TypedHeader(header)| header)
}

fn gate<S: SignerProvider>(
    state: &S,
    credentials: &Authorization<Basic>,
    path: &str,
    method: &str,
) -> Result<String, ExtractError> {
    let request = AccessRequest {
        username: credentials.username(),
        token: credentials.password(),
        path,
        method,
    };

    match authorize(&request, state.signer(), OffsetDateTime::now_utc()) {
        Decision::Allow => Ok(credentials.username().to_string()),
        Decision::Deny(reason) => Err(ExtractError::Denied(reason)),
    }
}

//--------------------------------------------------------------------------------------------------
// Axum extractor gating the request it is applied to
//--------------------------------------------------------------------------------------------------

/// Succeeds only when the Basic credentials carry a token that allows this request's own path and
/// method. The query string is never consulted.
#[derive(Debug)]
pub struct RegistryAccess {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for RegistryAccess
where
    S: SignerProvider + Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let credentials = basic_credentials(parts).await?;
        let username = gate(state, &credentials, parts.uri.path(), parts.method.as_str())?;
        Ok(RegistryAccess { username })
    }
}

//--------------------------------------------------------------------------------------------------
// Axum extractor gating a request forwarded by a reverse proxy
//--------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
struct ForwardedRequest {
    path: String,
    method: Option<String>,
}

/// For auth subrequests: the registry request being asked about is passed as the `path` and
/// `method` query parameters. A missing `method` means the subrequest's own method.
#[derive(Debug)]
pub struct ForwardedRegistryAccess {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for ForwardedRegistryAccess
where
    S: SignerProvider + Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let credentials = basic_credentials(parts).await?;

        let Ok(Query(forwarded)) = Query::<ForwardedRequest>::try_from_uri(&parts.uri) else {
            warn!("Auth subrequest made without a usable path query parameter");
            return Err(ExtractError::InvalidQuery);
        };

        let method = forwarded.method.as_deref().unwrap_or(parts.method.as_str());
        let username = gate(state, &credentials, &forwarded.path, method)?;
        Ok(ForwardedRegistryAccess { username })
    }
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonce::RandomNonce;
    use crate::token::{issue_token, IssueRequest};
    use crate::types::SharedSecret;
    use axum::http::header::AUTHORIZATION;
    use axum::http::Request;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use time::Duration;

    struct TestState(Signer);

    impl SignerProvider for TestState {
        fn signer(&self) -> &Signer {
            &self.0
        }
    }

    fn state() -> Arc<TestState> {
        Arc::new(TestState(
            Signer::new(&SharedSecret::new("secret").unwrap()).unwrap(),
        ))
    }

    fn token(state: &TestState, access: &str) -> String {
        let now = OffsetDateTime::now_utc();
        let request = IssueRequest {
            username: "u",
            account: "acct",
            access,
            expires_at: now + Duration::hours(1),
        };
        issue_token(&request, state.signer(), &RandomNonce, now)
            .unwrap()
            .into_string()
    }

    fn basic(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }

    fn parts(method: &str, uri: &str, authorization: Option<String>) -> Parts {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    async fn direct(
        state: &Arc<TestState>,
        method: &str,
        uri: &str,
        authorization: Option<String>,
    ) -> Result<RegistryAccess, ExtractError> {
        let mut parts = parts(method, uri, authorization);
        RegistryAccess::from_request_parts(&mut parts, state).await
    }

    async fn forwarded(
        state: &Arc<TestState>,
        method: &str,
        uri: &str,
        authorization: Option<String>,
    ) -> Result<ForwardedRegistryAccess, ExtractError> {
        let mut parts = parts(method, uri, authorization);
        ForwardedRegistryAccess::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn gates_the_request_itself() {
        let state = state();
        let t = token(&state, "read");

        let access = direct(&state, "GET", "/v2/acct/repo/blobs/sha256:1", Some(basic("u", &t)))
            .await
            .unwrap();
        assert_eq!(access.username, "u");

        let denied = direct(&state, "PUT", "/v2/acct/repo/blobs/sha256:1", Some(basic("u", &t)));
        assert_eq!(
            denied.await.unwrap_err(),
            ExtractError::Denied(AuthError::InsufficientAccess)
        );
    }

    #[tokio::test]
    async fn request_itself_ignores_query_parameters() {
        let state = state();
        let t = token(&state, "read");

        let push = direct(
            &state,
            "PUT",
            "/v2/victim/repo/blobs/uploads/abc?path=/v2/acct/repo/blobs/x&method=GET",
            Some(basic("u", &t)),
        );
        assert_eq!(
            push.await.unwrap_err(),
            ExtractError::Denied(AuthError::Unauthorized)
        );

        let own_push = direct(
            &state,
            "PUT",
            "/v2/acct/repo/blobs/uploads/abc?method=GET",
            Some(basic("u", &t)),
        );
        assert_eq!(
            own_push.await.unwrap_err(),
            ExtractError::Denied(AuthError::InsufficientAccess)
        );
    }

    #[tokio::test]
    async fn forwarded_request_comes_from_the_query() {
        let state = state();
        let t = token(&state, "read");

        let pull = forwarded(
            &state,
            "POST",
            "/auth?path=/v2/acct/repo/manifests/latest&method=GET",
            Some(basic("u", &t)),
        );
        assert_eq!(pull.await.unwrap().username, "u");

        let push = forwarded(
            &state,
            "GET",
            "/auth?path=/v2/acct/repo/manifests/latest&method=PUT",
            Some(basic("u", &t)),
        );
        assert_eq!(
            push.await.unwrap_err(),
            ExtractError::Denied(AuthError::InsufficientAccess)
        );

        // No method parameter falls back to the subrequest's method
        let other_account = forwarded(
            &state,
            "GET",
            "/auth?path=/v2/other/repo/manifests/latest",
            Some(basic("u", &t)),
        );
        assert_eq!(
            other_account.await.unwrap_err(),
            ExtractError::Denied(AuthError::Unauthorized)
        );

        let no_path = forwarded(&state, "GET", "/auth?method=GET", Some(basic("u", &t)));
        assert_eq!(no_path.await.unwrap_err(), ExtractError::InvalidQuery);
    }

    #[tokio::test]
    async fn rejects_missing_or_broken_credentials() {
        let state = state();

        let none = direct(&state, "GET", "/v2/", None).await;
        assert_eq!(none.unwrap_err(), ExtractError::NoAuthorizationHeader);

        let bearer = direct(&state, "GET", "/v2/", Some("Bearer abc".to_string())).await;
        assert_eq!(bearer.unwrap_err(), ExtractError::InvalidAuthorizationHeader);

        let no_colon = format!("Basic {}", STANDARD.encode("justauser"));
        let no_colon = direct(&state, "GET", "/v2/", Some(no_colon)).await;
        assert_eq!(no_colon.unwrap_err(), ExtractError::InvalidAuthorizationHeader);

        let bad_token = direct(&state, "GET", "/v2/", Some(basic("u", "nope"))).await;
        assert_eq!(
            bad_token.unwrap_err(),
            ExtractError::Denied(AuthError::MalformedToken)
        );

        let none = forwarded(&state, "GET", "/auth?path=/v2/", None).await;
        assert_eq!(none.unwrap_err(), ExtractError::NoAuthorizationHeader);
    }

    #[test]
    fn rejection_is_a_basic_challenge() {
        let response = ExtractError::Denied(AuthError::TokenExpired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            BASIC_CHALLENGE
        );
    }
}

//--------------------------------------------------------------------------------------------------
