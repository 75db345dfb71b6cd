use crate::handler_proxy;
use crate::state::StateRef;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::routing::{any, post};
use axum::Router;
use std::iter::once;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::request_id::MakeRequestUuid;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::ServiceBuilderExt;
use tracing::{span, Level};

//--------------------------------------------------------------------------------------------------
// Routers for the two listeners
//--------------------------------------------------------------------------------------------------

pub const GENERATE_TOKEN_PATH: &str = "/.secret/generate-token";
pub const FORWARDED_AUTH_PATH: &str = "/auth";

/// Issues tokens. Must only be reachable by trusted callers.
pub fn admin_router(state: StateRef) -> Router {
    with_middleware(
        Router::new()
            .route(GENERATE_TOKEN_PATH, post(handler_proxy::generate_token))
            .with_state(state),
    )
}

/// Answers 200 or 401. `/auth` judges the request named by its `path` and `method` query
/// parameters, for reverse proxy auth subrequests. Any other path judges the request itself.
pub fn auth_router(state: StateRef) -> Router {
    with_middleware(
        Router::new()
            .route(FORWARDED_AUTH_PATH, any(handler_proxy::check_forwarded_access))
            .fallback(handler_proxy::check_access)
            .with_state(state),
    )
}

fn with_middleware(router: Router) -> Router {
    router.layer(
        ServiceBuilder::new()
            .sensitive_headers(once(AUTHORIZATION))
            .set_x_request_id(MakeRequestUuid)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|hv| hv.to_str().ok())
                            .unwrap_or("unknown");
                        span!(
                            Level::INFO,
                            "http_request",
                            request_id,
                            http_request.request_method = request.method().as_str(),
                            http_request.request_url = request.uri().path()
                        )
                    })
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .propagate_x_request_id()
            .layer(TimeoutLayer::new(Duration::from_secs(10))),
    )
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
