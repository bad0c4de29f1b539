use thiserror::Error;

use weft_engine::EngineError;

pub type PreviewResult<T> = Result<T, PreviewError>;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Malformed renderer message: {message}")]
    Decode { message: String },

    #[error("Renderer message uses protocol version {got}, host expects {expected}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("Renderer message from unknown sender '{sender}'")]
    UnknownSender { sender: String },

    #[error("No preview session with id '{session_id}'")]
    SessionNotFound { session_id: String },
}
