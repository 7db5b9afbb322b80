use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid file encoding")]
    InvalidEncoding,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            RequestError::InvalidEncoding => StatusCode::BAD_REQUEST,
            RequestError::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
        }
    }
}
