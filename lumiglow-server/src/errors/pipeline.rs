#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("AI failed to create an appropriate response after {attempts} attempts")]
    NoValidResponse { attempts: u32 },
}
