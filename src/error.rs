use std::io;

/// All recoverable failures of the crate.
///
/// Tensor shape violations are not represented here: mismatched operands in
/// arithmetic are programming errors and panic at the call site. Everything
/// that depends on the outside world (files, streams, configuration) comes
/// back as an `Error`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(io::Error),

    /// The stream ended before a complete tensor, layer or network was read.
    #[error("truncated stream while reading {what}")]
    Truncated { what: &'static str },

    #[error("unknown activation tag {0}")]
    UnknownActivation(u32),

    /// The model file decoded, but its shapes do not chain into a network.
    #[error("corrupt model: {0}")]
    CorruptModel(String),

    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("element count mismatch: expected {expected}, got {got}")]
    ElementCount { expected: usize, got: usize },

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl Error {
    /// Maps an early end-of-file to `Truncated`, keeping other i/o errors intact.
    pub(crate) fn reading(what: &'static str) -> impl FnOnce(io::Error) -> Error {
        move |e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::Truncated { what }
            } else {
                Error::Io(e)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
