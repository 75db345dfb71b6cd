use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

//--------------------------------------------------------------------------------------------------
// Error handling
//--------------------------------------------------------------------------------------------------

// Any errors returned by a handler should conform to this
pub trait RegAuthError: Sized {
    fn response_data(&self) -> (StatusCode, &'static str, String);
}

pub struct StandaloneError<E>(E)
where
    E: RegAuthError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

//--------------------------------------------------------------------------------------------------
// Plain text response handling
//--------------------------------------------------------------------------------------------------

// Tokens go back to the caller as the bare string, errors as JSON
pub struct TextResponse<E: RegAuthError>(Result<String, E>);

impl<E: RegAuthError> From<Result<String, E>> for TextResponse<E> {
    fn from(r: Result<String, E>) -> Self {
        TextResponse(r)
    }
}

//--------------------------------------------------------------------------------------------------
// IntoResponse handling
//--------------------------------------------------------------------------------------------------

impl<E: RegAuthError> IntoResponse for TextResponse<E> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(body) => (
                StatusCode::OK,
                [(CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(err) => StandaloneError(err).into_response(),
        }
    }
}

impl<E: RegAuthError> IntoResponse for StandaloneError<E> {
    fn into_response(self) -> Response {
        let (status_code, code, message) = self.0.response_data();
        let body = ErrorResponse { code, message };
        (status_code, Json(body)).into_response()
    }
}

//--------------------------------------------------------------------------------------------------
