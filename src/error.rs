//! Error types for the equipment scanner

use thiserror::Error;

use crate::models::device::DeviceId;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Errors reported by a media-capture backend.
///
/// Backends built on the browser media API translate DOM exception names with
/// [`MediaError::from_dom_name`]; call sites never compare strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("camera permission denied: {0}")]
    NotAllowed(String),

    #[error("camera not found: {0}")]
    NotFound(String),

    #[error("camera not readable: {0}")]
    NotReadable(String),

    #[error("camera constraints cannot be satisfied: {0}")]
    Overconstrained(String),

    #[error("camera acquisition aborted: {0}")]
    Abort(String),

    #[error("camera error: {0}")]
    Other(String),
}

impl MediaError {
    /// Map a DOM exception name (`NotAllowedError`, ...) onto a variant
    pub fn from_dom_name(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => {
                MediaError::NotAllowed(message)
            }
            "NotFoundError" | "DevicesNotFoundError" => MediaError::NotFound(message),
            "NotReadableError" | "TrackStartError" => MediaError::NotReadable(message),
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => {
                MediaError::Overconstrained(message)
            }
            "AbortError" => MediaError::Abort(message),
            _ => MediaError::Other(format!("{}: {}", name, message)),
        }
    }
}

/// Errors reported by a code decoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("decoder not ready")]
    NotReady,

    #[error("decoder failed: {0}")]
    Failed(String),
}

/// What the user can do about a scan error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    RequestPermission,
    Retry,
}

/// Errors surfaced by a scanner session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("no camera found on this device")]
    NoDevice,

    #[error("no camera could be opened")]
    NoReadableDevice,

    #[error("camera access was denied")]
    PermissionDenied,

    #[error("camera {device} is already in use")]
    DeviceBusy { device: DeviceId },

    #[error("camera error: {0}")]
    Camera(String),

    #[error("scanner failed to initialise: {0}")]
    DecoderInit(String),

    #[error("scanner stopped: {0}")]
    Decoder(String),

    #[error("no equipment with code {code}")]
    LookupNotFound { code: String },

    #[error("equipment lookup failed: {0}")]
    LookupNetwork(String),

    #[error("equipment code is empty")]
    EmptyCode,

    #[error("a lookup is already in progress")]
    ResolutionInFlight,

    #[error("cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    #[error("scanner session is closed")]
    SessionClosed,
}

impl ScanError {
    /// Stable identifier, suitable for logs and UI string tables
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::NoDevice => "NoDeviceError",
            ScanError::NoReadableDevice => "NoReadableDeviceError",
            ScanError::PermissionDenied => "PermissionDeniedError",
            ScanError::DeviceBusy { .. } => "DeviceBusyError",
            ScanError::Camera(_) => "CameraError",
            ScanError::DecoderInit(_) => "DecoderInitError",
            ScanError::Decoder(_) => "DecoderError",
            ScanError::LookupNotFound { .. } => "LookupNotFoundError",
            ScanError::LookupNetwork(_) => "LookupNetworkError",
            ScanError::EmptyCode => "EmptyCodeError",
            ScanError::ResolutionInFlight => "ResolutionInFlightError",
            ScanError::InvalidState { .. } => "InvalidStateError",
            ScanError::SessionClosed => "SessionClosedError",
        }
    }

    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            ScanError::PermissionDenied => Some(Remediation::RequestPermission),
            ScanError::DeviceBusy { .. }
            | ScanError::Camera(_)
            | ScanError::NoReadableDevice
            | ScanError::Decoder(_) => Some(Remediation::Retry),
            _ => None,
        }
    }

    /// Lookup failures keep the camera running; everything else halts it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScanError::LookupNotFound { .. }
                | ScanError::LookupNetwork(_)
                | ScanError::EmptyCode
                | ScanError::ResolutionInFlight
                | ScanError::InvalidState { .. }
        )
    }

    /// Translate a failed acquisition of `device`
    pub fn from_media(device: &DeviceId, err: MediaError) -> Self {
        match err {
            MediaError::NotAllowed(_) => ScanError::PermissionDenied,
            MediaError::NotReadable(_) => ScanError::DeviceBusy {
                device: device.clone(),
            },
            MediaError::NotFound(_) => ScanError::NoDevice,
            other => ScanError::Camera(other.to_string()),
        }
    }
}

impl From<DecodeError> for ScanError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::NotReady => ScanError::DecoderInit("decoder not ready".to_string()),
            DecodeError::Failed(msg) => ScanError::DecoderInit(msg),
        }
    }
}

impl From<AppError> for ScanError {
    fn from(e: AppError) -> Self {
        ScanError::LookupNetwork(e.to_string())
    }
}
