use thiserror::Error;

/// Failure of a call to the generation service.
///
/// The variants only matter for logging; at the controller boundary every
/// variant becomes the same error notice carrying [`FormError::message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// No response reached the client.
    #[error("transport error: {0}")]
    Transport(String),
    /// A response arrived but signalled failure.
    #[error("service error: {0}")]
    Service(String),
    /// The response signalled success but did not carry a usable schema bundle.
    #[error("parse error: {0}")]
    Parse(String),
}

impl FormError {
    /// Text shown to the user.
    pub fn message(&self) -> &str {
        match self {
            FormError::Transport(m) | FormError::Service(m) | FormError::Parse(m) => m,
        }
    }
}
