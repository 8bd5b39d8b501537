use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("External service error: {0}")]
    ExternalService(String),
}

impl AppError {
    /// Text suitable for posting back to the requester's channel.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Db(_) => "The record store is unavailable, please try again later".into(),
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidField(name) => format!(
                "Unknown field '{}'. Correctable fields: user_name, level, miss_type_count, speed, accuracy",
                name
            ),
            AppError::InvalidValue { field, value } => {
                format!("'{}' is not a valid value for {}", value, field)
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::ExternalService(_) => {
                "Could not read a result from that image, please try another one".into()
            }
        }
    }
}

impl WebResponseError for AppError {
    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let status = match self {
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::InvalidField(_) | AppError::InvalidValue { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
        };
        HttpResponse::build(status).json(&serde_json::json!({ "error": self.user_message() }))
    }
}
