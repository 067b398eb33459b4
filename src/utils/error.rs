use thiserror::Error;

/// Non-success status reported by the device for a single command.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceError {
    #[error("generic device error")]
    Error,
    #[error("null pointer")]
    NullPointer,
    #[error("invalid CRC")]
    InvalidCrc,
    #[error("invalid frame")]
    InvalidFrame,
    #[error("time out")]
    TimeOut,
    #[error("write error")]
    WriteError,
    #[error("read error")]
    ReadError,
    #[error("buffer overflow")]
    BufferOverflow,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("device not ready")]
    NotReady,
    #[error("allocation failed")]
    MallocFailed,
    #[error("frame is not continuous")]
    NotContinuousFrame,
    #[error("incompatible hardware")]
    IncompatibleHardware,
    #[error("invalid version")]
    InvalidVersion,
    #[error("device not found")]
    DeviceNotFound,
    #[error("operation cancelled")]
    OperationCancelled,
}

pub type DeviceResult<T> = std::result::Result<T, DeviceError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Device image error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl SyncError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::IoError(_) => "Check that the file exists and is readable",
            SyncError::SerializationError(_) => {
                "Check that the device image is valid JSON produced by this tool"
            }
            SyncError::ConfigValidationError { .. } => {
                "Check the TOML syntax and section names of the configuration file"
            }
            SyncError::MissingConfigError { .. } => "Add the missing value to the configuration file",
            SyncError::InvalidConfigValueError { .. } => {
                "Fix the reported value in the configuration file"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
