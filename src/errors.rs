use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetGraphError {
    #[error("configuration error: {0}")]
    ConfigurationError(String),
    #[error("unsupported wire document ({message})")]
    ProtocolVersionError { message: String, raw: String },
    #[error("grid error: {0}")]
    GridError(String),
}

impl SheetGraphError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        SheetGraphError::ConfigurationError(msg.into())
    }

    /// `raw` keeps the offending payload around for diagnostics.
    pub fn protocol_version<M: Into<String>, R: Into<String>>(msg: M, raw: R) -> Self {
        SheetGraphError::ProtocolVersionError {
            message: msg.into(),
            raw: raw.into(),
        }
    }

    pub fn grid<T: Into<String>>(msg: T) -> Self {
        SheetGraphError::GridError(msg.into())
    }
}
