//! Camera and decoder abstraction
//!
//! Platform backends implement these traits; the scanner session only ever
//! talks to them through `Arc<dyn ...>` handles.

pub mod headless;

use async_trait::async_trait;
use std::fmt;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error::{DecodeError, MediaError};
use crate::models::{DecodeEvent, DeviceId, TrackState, VideoDevice};

pub use headless::HeadlessMedia;

/// Continuous decoder output; dropping the feed releases the decoder
pub type DecodeFeed = Pin<Box<dyn Stream<Item = DecodeEvent> + Send>>;

/// Device enumeration and capture
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn enumerate_video_inputs(&self) -> Result<Vec<VideoDevice>, MediaError>;

    async fn acquire_camera(&self, device_id: &DeviceId) -> Result<Box<dyn MediaStream>, MediaError>;
}

/// A live capture from one device.
///
/// Implementations should also stop their tracks when dropped.
pub trait MediaStream: Send + Sync + fmt::Debug {
    fn device_id(&self) -> &DeviceId;

    fn track_states(&self) -> Vec<TrackState>;

    /// Stop every track. Must be idempotent.
    fn stop(&mut self);

    fn is_live(&self) -> bool {
        self.track_states().iter().any(|s| *s == TrackState::Live)
    }
}

#[async_trait]
pub trait CodeDecoder: Send + Sync {
    /// Start decoding frames from `stream`.
    ///
    /// Returns [`DecodeError::NotReady`] when the decoder is not initialised yet.
    async fn decode_continuous(&self, stream: &dyn MediaStream) -> Result<DecodeFeed, DecodeError>;
}
