//! Scanner session state and events

use std::fmt;

use uuid::Uuid;

use crate::error::ScanError;
use crate::models::device::DeviceId;
use crate::models::equipment::EquipmentRecord;

/// Lifecycle of a scanner session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No camera acquired
    Idle,
    Initializing,
    Scanning,
    Resolving,
    /// Halted until an explicit retry
    Error,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Initializing => "initializing",
            SessionState::Scanning => "scanning",
            SessionState::Resolving => "resolving",
            SessionState::Error => "in error",
            SessionState::Closed => "closed",
        };
        write!(f, "{}", label)
    }
}

/// One frame's worth of decoder output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Decoded(String),
    /// No code in frame; not an error
    Miss,
    Fatal(String),
}

/// Outcome of resolving a code
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult {
    EquipmentFound(EquipmentRecord),
    NotFound,
    Error(ScanError),
}

impl From<Result<EquipmentRecord, ScanError>> for ScanResult {
    fn from(result: Result<EquipmentRecord, ScanError>) -> Self {
        match result {
            Ok(record) => ScanResult::EquipmentFound(record),
            Err(ScanError::LookupNotFound { .. }) => ScanResult::NotFound,
            Err(e) => ScanResult::Error(e),
        }
    }
}

/// Notifications published on the session's event bus
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    StateChanged(SessionState),
    EquipmentFound(EquipmentRecord),
    NotFound { code: String },
    Error(ScanError),
}

/// Observable view of a scanner session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: SessionState,
    pub scanning: bool,
    pub error: Option<ScanError>,
    pub selected_device: Option<DeviceId>,
    pub handling_scan: bool,
}
