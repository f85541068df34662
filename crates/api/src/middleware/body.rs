//! Body extractors whose rejections use the `{ "error", "code" }` format.
//!
//! axum's own `Json` and `Form` reject with a `text/plain` body that echoes the
//! serde message. These wrappers log that text at `debug` and return an
//! [`AppError`] with a fixed message instead.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{FromRequest, Request};
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use staybook_core::error::CoreError;

use crate::error::AppError;

/// Message for a well-formed body that does not deserialize into the target type.
pub const INVALID_BODY_MESSAGE: &str = "Request body is missing a field or has an invalid value";

/// JSON request body.
///
/// A syntactically valid document of the wrong shape is a `400
/// VALIDATION_ERROR`. Every other rejection is a `400 BAD_REQUEST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!(detail = %rejection.body_text(), "Rejected JSON body");
                Err(json_rejection_error(&rejection))
            }
        }
    }
}

/// `application/x-www-form-urlencoded` request body, rejected like [`ApiJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiForm<T>(pub T);

impl<T, S> FromRequest<S> for ApiForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(ApiForm(value)),
            Err(rejection) => {
                tracing::debug!(detail = %rejection.body_text(), "Rejected form body");
                Err(form_rejection_error(&rejection))
            }
        }
    }
}

fn json_rejection_error(rejection: &JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(_) => invalid_body(),
        JsonRejection::JsonSyntaxError(_) => {
            AppError::BadRequest("Request body is not valid JSON".to_string())
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::BadRequest("Expected Content-Type: application/json".to_string())
        }
        _ => AppError::BadRequest("Request body could not be read".to_string()),
    }
}

fn form_rejection_error(rejection: &FormRejection) -> AppError {
    match rejection {
        FormRejection::FailedToDeserializeForm(_) | FormRejection::FailedToDeserializeFormBody(_) => {
            invalid_body()
        }
        FormRejection::InvalidFormContentType(_) => AppError::BadRequest(
            "Expected Content-Type: application/x-www-form-urlencoded".to_string(),
        ),
        _ => AppError::BadRequest("Request body could not be read".to_string()),
    }
}

fn invalid_body() -> AppError {
    AppError::Core(CoreError::Validation(INVALID_BODY_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;
    use staybook_core::roles::Role;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
        #[serde(default)]
        role: Role,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn json_body_is_extracted() {
        let req = request("application/json", r#"{"name":"a","role":"HOST"}"#);
        let ApiJson(payload) = ApiJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.name, "a");
        assert_eq!(payload.role, Role::Host);
    }

    #[tokio::test]
    async fn unknown_enum_value_is_validation_error() {
        let req = request("application/json", r#"{"name":"a","role":"ROOT"}"#);
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Validation(msg)) if msg == INVALID_BODY_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = request("application/json", "{not json");
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_matches!(err, AppError::BadRequest(_));
    }

    #[tokio::test]
    async fn json_without_content_type_is_bad_request() {
        let req = request("text/plain", r#"{"name":"a"}"#);
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_matches!(err, AppError::BadRequest(_));
    }

    #[tokio::test]
    async fn form_missing_field_is_validation_error() {
        let req = request("application/x-www-form-urlencoded", "role=USER");
        let err = ApiForm::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn form_with_json_content_type_is_bad_request() {
        let req = request("application/json", "name=a");
        let err = ApiForm::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_matches!(err, AppError::BadRequest(_));
    }
}
