//! Error types for the paint bridge

use thiserror::Error;

/// Result type alias for bridge and rendering operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bridging engine callbacks onto a surface
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to create the native rendering session
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// The engine or surface failed to produce an image
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// The engine invoked a callback name the bridge does not know
    #[error("Unknown callback: {0:?}")]
    UnknownCallback(String),

    /// A callback arrived without its parameter block
    #[error("Null parameter block for callback {0}")]
    NullBlock(&'static str),

    /// A font handle that no prior `createFont` in this render produced
    #[error("Unknown font handle {0}")]
    UnknownFont(i32),

    /// A callback handler panicked; the panic was stopped at the C boundary
    #[error("Callback {0} panicked")]
    CallbackPanicked(String),

    /// Another container is already bound to this thread's callback slot
    #[error("A render is already in progress on this thread")]
    SessionBusy,

    /// The document cannot be handed to the engine as a C string
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A paint trace could not be parsed or replayed
    #[error("Trace error: {0}")]
    TraceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// PNG encoding failed
    #[error("Failed to encode image: {0}")]
    Encode(String),

    /// I/O error reading a document or writing an image
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::TraceError(err.to_string())
    }
}
