use rouille::{Response, input::json::JsonError};
use serde::Serialize;

use crate::{domain::track::TrackValidationError, service::ServiceError};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Validation(TrackValidationError),
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<&'static str>>,
}

impl ErrorBody {
    fn message(error: String) -> Self {
        Self {
            error,
            missing: None,
            fields: None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => ApiError::NotFound(format!("Track {} not found", id)),

            ServiceError::Validation(e) => ApiError::Validation(e),

            ServiceError::StorageUnavailable(e) => {
                log::error!("storage failure: {e}");
                ApiError::Internal("internal server error".into())
            }
        }
    }
}

impl From<JsonError> for ApiError {
    fn from(err: JsonError) -> Self {
        ApiError::BadRequest(format!("invalid JSON body: {err}"))
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) | ApiError::Validation(_) => 400,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Validation(TrackValidationError::MissingFields(missing)) => ErrorBody {
                error: "Missing required fields".into(),
                missing: Some(missing),
                fields: None,
            },

            ApiError::Validation(e) => ErrorBody {
                error: e.to_string(),
                missing: None,
                fields: Some(e.fields()),
            },

            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                ErrorBody::message(msg)
            }
        };

        Response::json(&body).with_status_code(status)
    }
}
