use thiserror::Error;

/// Errors raised while building the kernel's value types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration document could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// An environment variable held a value of the wrong shape
    #[error("Invalid value for {name}: {value}")]
    InvalidEnvVar { name: String, value: String },
}

/// Convenience Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
