#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Generation service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation returned no text")]
    EmptyResponse,

    #[error("Generation request could not be built: {0}")]
    InvalidRequest(String),
}
