//! Data models for the equipment scanner

pub mod device;
pub mod equipment;
pub mod scan;

// Re-export commonly used types
pub use device::{DeviceId, TrackState, VideoDevice};
pub use equipment::EquipmentRecord;
pub use scan::{DecodeEvent, ScanEvent, ScanResult, SessionSnapshot, SessionState};
