/// Reasons a generated descriptor is rejected. All of them are recoverable
/// by asking the model again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Descriptor is not valid JSON")]
    MalformedJson,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field: {0}")]
    InvalidField(&'static str),

    #[error("Neither color nor dynamic effect given while power is on, or both given")]
    AmbiguousLightMode,

    #[error("Unknown dynamic effect: {0}")]
    UnknownEffect(String),

    #[error("Invalid color code")]
    InvalidColor,
}
