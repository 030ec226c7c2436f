//! Camera selection
//!
//! Browsers expose no field saying which camera faces the environment, so
//! the choice is a heuristic: a label match first, then sequential probing
//! starting from the last enumerated device (often the rear camera on
//! phones). The ordering is platform-dependent, not a guarantee.

use crate::{
    error::{MediaError, ScanError},
    media::{MediaDevices, MediaStream},
    models::VideoDevice,
};

/// First device whose label contains one of `keywords` (case-insensitive)
pub fn preferred_rear_camera<'a>(
    devices: &'a [VideoDevice],
    keywords: &[String],
) -> Option<&'a VideoDevice> {
    devices.iter().find(|device| {
        let label = device.label.to_lowercase();
        keywords
            .iter()
            .any(|k| !k.is_empty() && label.contains(&k.to_lowercase()))
    })
}

/// Probe order: last device first, then the rest in enumeration order
pub fn probe_order(devices: &[VideoDevice]) -> Vec<&VideoDevice> {
    match devices.split_last() {
        Some((last, rest)) => std::iter::once(last).chain(rest.iter()).collect(),
        None => Vec::new(),
    }
}

/// Enumerate, pick and open a camera.
///
/// Candidates are tried one at a time so at most one device handle is held.
pub async fn acquire_preferred_camera(
    media: &dyn MediaDevices,
    keywords: &[String],
) -> Result<Box<dyn MediaStream>, ScanError> {
    let devices = media.enumerate_video_inputs().await.map_err(|e| match e {
        MediaError::NotAllowed(_) => ScanError::PermissionDenied,
        other => ScanError::Camera(other.to_string()),
    })?;

    if devices.is_empty() {
        return Err(ScanError::NoDevice);
    }
    tracing::debug!(count = devices.len(), "Enumerated video inputs");

    if let Some(device) = preferred_rear_camera(&devices, keywords) {
        tracing::info!(device = %device.device_id, label = %device.label, "Using rear camera by label");
        return media
            .acquire_camera(&device.device_id)
            .await
            .map_err(|e| ScanError::from_media(&device.device_id, e));
    }

    for device in probe_order(&devices) {
        match media.acquire_camera(&device.device_id).await {
            Ok(stream) => {
                tracing::info!(device = %device.device_id, label = %device.label, "Camera probe succeeded");
                return Ok(stream);
            }
            Err(MediaError::NotAllowed(_)) => return Err(ScanError::PermissionDenied),
            Err(e) => {
                tracing::debug!(device = %device.device_id, error = %e, "Camera probe failed");
            }
        }
    }

    Err(ScanError::NoReadableDevice)
}
