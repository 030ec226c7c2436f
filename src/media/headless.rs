//! Media backend for hosts without a camera (terminals, kiosks with a
//! keyboard-wedge scanner). Only manual entry works against it.

use async_trait::async_trait;

use super::{CodeDecoder, DecodeFeed, MediaDevices, MediaStream};
use crate::error::{DecodeError, MediaError};
use crate::models::{DeviceId, VideoDevice};

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessMedia;

#[async_trait]
impl MediaDevices for HeadlessMedia {
    async fn enumerate_video_inputs(&self) -> Result<Vec<VideoDevice>, MediaError> {
        Ok(Vec::new())
    }

    async fn acquire_camera(&self, device_id: &DeviceId) -> Result<Box<dyn MediaStream>, MediaError> {
        Err(MediaError::NotFound(format!("no camera {} on a headless host", device_id)))
    }
}

#[async_trait]
impl CodeDecoder for HeadlessMedia {
    async fn decode_continuous(&self, _stream: &dyn MediaStream) -> Result<DecodeFeed, DecodeError> {
        Err(DecodeError::NotReady)
    }
}
