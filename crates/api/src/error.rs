use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flockkit_auth::AuthError;
use serde::Serialize;

/// Validation failures come back as an array of field messages.
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub errors: Vec<ValidationMessage>,
}

#[derive(Debug, Serialize)]
pub struct ValidationMessage {
    pub msg: String,
}

/// Domain misses and token failures carry a single message.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Infrastructure failures are opaque to the client.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Single mapping from the lifecycle error taxonomy onto HTTP responses.
/// Every handler funnels through this, so a request always gets a response
/// and a 500 body never carries internal detail.
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AuthError::Validation(messages) => {
                let body = ValidationBody {
                    errors: messages
                        .into_iter()
                        .map(|msg| ValidationMessage { msg })
                        .collect(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            // Same shape and message for unknown email and wrong password.
            err @ (AuthError::InvalidCredentials | AuthError::Unverified) => {
                let body = ValidationBody {
                    errors: vec![ValidationMessage {
                        msg: err.to_string(),
                    }],
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AuthError::InvalidToken(message) => {
                let body = MessageBody {
                    message: message.to_string(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AuthError::NotFound(what) => {
                let body = MessageBody {
                    message: format!("{what} not found"),
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            AuthError::Forbidden | AuthError::TokenValidation(_) | AuthError::TokenExpired => {
                let body = MessageBody {
                    message: "Missing or invalid authorization".to_string(),
                };
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            err => {
                tracing::error!(error = %err, "request failed");
                let body = ErrorBody {
                    error: "Internal server error".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
