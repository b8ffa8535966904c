use axum::{
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    extract::{
        FromRequest,
        FromRequestParts,
        Request,
        Path,
        rejection::JsonRejection
    },
    Json,
};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    error::Error,
    collections::BTreeMap
};
use thiserror::Error as ThisError;
use validator::ValidationErrors;
use crate::dto::ErrorRouting;

#[derive(Debug, PartialEq)]
pub enum ErrorMessage {
    ServerError,
    UserNoLongerExist,
    TokenInvalid,
    TokenNotProvided,
}

impl ErrorMessage {
    fn get_message(&self) -> String {
        match self {
            ErrorMessage::ServerError => "Internal Server Error. Please try again later.".to_string(),
            ErrorMessage::UserNoLongerExist => "User belonging to this token no longer exists.".to_string(),
            ErrorMessage::TokenInvalid => "Authentication token is invalid or expired.".to_string(),
            ErrorMessage::TokenNotProvided => "You are not logged in, please provide a token.".to_string(),
        }
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.get_message())
    }
}

/// Domain-level failure taxonomy. Services and repositories speak this;
/// the HTTP layer maps it onto status codes in one place.
#[derive(Debug, ThisError)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("The {0} is not found.")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Internal(#[from] sqlx::Error),
}

pub fn map_service_error(err: ServiceError) -> HttpError<ErrorPayload> {
    match err {
        ServiceError::Validation(message) => HttpError::bad_request(message, None),
        ServiceError::NotFound(what) => {
            HttpError::not_found(format!("The {} is not found.", what), None)
        }
        ServiceError::Forbidden(message) => HttpError::forbidden(message, None),
        ServiceError::Conflict(message) => HttpError::conflict(message, None),
        ServiceError::Internal(source) => {
            tracing::error!(error = %source, "storage failure");
            HttpError::server_error(ErrorMessage::ServerError.to_string(), None)
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse<'a, T> {
    pub status: &'a str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<T>,
}

#[derive(Debug)]
pub struct HttpError<T> {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    ValidationErrors(Vec<FieldError>),
}

impl<'a, T> Display for ErrorResponse<'a, T> where T: Serialize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", serde_json::to_string(&self).unwrap())
    }
}

impl<T> HttpError<T> where T: Serialize {
    pub fn server_error(message: impl Into<String>, error: Option<T>) -> Self {
        HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            error,
        }
    }
    pub fn bad_request(message: impl Into<String>, error: Option<T>) -> Self {
        HttpError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            error,
        }
    }
    pub fn not_found(message: impl Into<String>, error: Option<T>) -> Self {
        HttpError {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
            error,
        }
    }
    pub fn conflict(message: impl Into<String>, error: Option<T>) -> Self {
        HttpError {
            status: StatusCode::CONFLICT,
            message: message.into(),
            error,
        }
    }
    pub fn unauthorized(message: impl Into<String>, error: Option<T>) -> Self {
        HttpError {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
            error,
        }
    }
    pub fn forbidden(message: impl Into<String>, error: Option<T>) -> Self {
        HttpError {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
            error,
        }
    }
}

impl<T> Display for HttpError<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "HttpError: message: {}, status: {}",
            self.message, self.status
        )
    }
}

impl<T> Error for HttpError<T> where T: Debug {}

impl<T> IntoResponse for HttpError<T> where T: Serialize + Debug {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            status: "error",
            message: self.message,
            error: self.error,
        });
        (self.status, body).into_response()
    }
}

impl FieldError {
    pub fn collect_errors(errors: ValidationErrors) -> Vec<Self> {
        let mut error_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, messages) in errors.field_errors() {
            let entry = error_map.entry(field.to_string()).or_default();
            for message in messages {
                let msg = message
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| message.code.to_string());
                entry.push(msg);
            }
        }
        error_map
            .into_iter()
            .map(|(field, messages)| FieldError { field, messages })
            .collect()
    }
    pub fn populate_errors(err: ValidationErrors) -> HttpError<ErrorPayload> {
        let errors = FieldError::collect_errors(err);
        HttpError::bad_request("Validation Errors", Some(ErrorPayload::ValidationErrors(errors)))
    }
}

pub struct BodyParser<T>(pub T);
impl<S, T> FromRequest<S> for BodyParser<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorRouting>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let payload = ErrorRouting {
                    status: "error".to_string(),
                    message: rejection.body_text(),
                };
                Err((rejection.status(), Json(payload)))
            }
        }
    }
}

pub struct PathParser<T>(pub T);
impl<S, T> FromRequestParts<S> for PathParser<T>
where
    T: DeserializeOwned + Send + Sync,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorRouting>);
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let payload = ErrorRouting {
                    status: "error".to_string(),
                    message: rejection.to_string(),
                };
                Err((StatusCode::BAD_REQUEST, Json(payload)))
            }
        }
    }
}
