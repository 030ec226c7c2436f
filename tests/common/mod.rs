//! Test doubles for the media, decoder and catalog collaborators

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

use equipment_scanner::{
    config::ScannerConfig,
    error::{AppError, AppResult, DecodeError, MediaError},
    media::{CodeDecoder, DecodeFeed, MediaDevices, MediaStream},
    models::{DecodeEvent, DeviceId, EquipmentRecord, ScanEvent, TrackState, VideoDevice},
    repository::EquipmentSource,
    services::{lookup::LookupService, scanner::ScannerService},
};

#[derive(Debug)]
pub struct FakeStream {
    device_id: DeviceId,
    live: Arc<AtomicBool>,
}

impl MediaStream for FakeStream {
    fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    fn track_states(&self) -> Vec<TrackState> {
        if self.live.load(Ordering::SeqCst) {
            vec![TrackState::Live]
        } else {
            vec![TrackState::Ended]
        }
    }

    fn stop(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeMedia {
    devices: Vec<VideoDevice>,
    failures: Mutex<HashMap<DeviceId, VecDeque<MediaError>>>,
    acquired: Mutex<Vec<DeviceId>>,
    tracks: Mutex<Vec<Arc<AtomicBool>>>,
    enumerations: AtomicUsize,
}

impl FakeMedia {
    /// `(device_id, label)` pairs in enumeration order
    pub fn new(devices: &[(&str, &str)]) -> Self {
        Self {
            devices: devices
                .iter()
                .map(|(id, label)| VideoDevice::new(*id, *label))
                .collect(),
            ..Default::default()
        }
    }

    /// Make the next acquisition of `device` fail with `error`
    pub fn fail_next(&self, device: &str, error: MediaError) {
        self.failures
            .lock()
            .unwrap()
            .entry(DeviceId::from(device))
            .or_default()
            .push_back(error);
    }

    pub fn acquired(&self) -> Vec<String> {
        self.acquired
            .lock()
            .unwrap()
            .iter()
            .map(|d| d.as_str().to_string())
            .collect()
    }

    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub fn live_tracks(&self) -> usize {
        self.tracks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.load(Ordering::SeqCst))
            .count()
    }

    pub fn all_tracks_ended(&self) -> bool {
        self.live_tracks() == 0
    }
}

#[async_trait]
impl MediaDevices for FakeMedia {
    async fn enumerate_video_inputs(&self) -> Result<Vec<VideoDevice>, MediaError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self.devices.clone())
    }

    async fn acquire_camera(&self, device_id: &DeviceId) -> Result<Box<dyn MediaStream>, MediaError> {
        self.acquired.lock().unwrap().push(device_id.clone());

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(device_id)
            .and_then(|queue| queue.pop_front());
        if let Some(error) = failure {
            return Err(error);
        }

        let live = Arc::new(AtomicBool::new(true));
        self.tracks.lock().unwrap().push(Arc::clone(&live));
        Ok(Box::new(FakeStream {
            device_id: device_id.clone(),
            live,
        }))
    }
}

/// Decoder whose frames are pushed by the test
pub struct FakeDecoder {
    feed: Mutex<Option<mpsc::UnboundedReceiver<DecodeEvent>>>,
    not_ready: AtomicBool,
}

impl FakeDecoder {
    pub fn new() -> (Self, mpsc::UnboundedSender<DecodeEvent>) {
        let (frames, feed) = mpsc::unbounded_channel();
        let decoder = Self {
            feed: Mutex::new(Some(feed)),
            not_ready: AtomicBool::new(false),
        };
        (decoder, frames)
    }

    pub fn not_ready() -> Self {
        let (decoder, _) = Self::new();
        decoder.not_ready.store(true, Ordering::SeqCst);
        decoder
    }
}

#[async_trait]
impl CodeDecoder for FakeDecoder {
    async fn decode_continuous(&self, _stream: &dyn MediaStream) -> Result<DecodeFeed, DecodeError> {
        if self.not_ready.load(Ordering::SeqCst) {
            return Err(DecodeError::NotReady);
        }
        match self.feed.lock().unwrap().take() {
            Some(feed) => Ok(Box::pin(UnboundedReceiverStream::new(feed))),
            None => Err(DecodeError::Failed("feed already consumed".into())),
        }
    }
}

/// In-memory catalog
#[derive(Default)]
pub struct StaticCatalog {
    records: Vec<EquipmentRecord>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticCatalog {
    pub fn new(records: Vec<EquipmentRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EquipmentSource for StaticCatalog {
    async fn fetch_equipment_list(&self) -> AppResult<Vec<EquipmentRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AppError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.records.clone())
    }
}

pub fn record(code: &str, name: &str) -> EquipmentRecord {
    serde_json::from_value(serde_json::json!({
        "item_code": code,
        "name": name,
        "status": "available",
        "quantity": 1
    }))
    .unwrap()
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new(vec![record("EQ-001", "Projector"), record("EQ-002", "Tripod")])
}

pub fn scanner(
    media: Arc<FakeMedia>,
    decoder: Arc<FakeDecoder>,
    catalog: Arc<StaticCatalog>,
    cooldown_ms: u64,
) -> ScannerService {
    let config = ScannerConfig {
        cooldown_ms,
        ..Default::default()
    };
    ScannerService::new(media, decoder, LookupService::new(catalog), config)
}

pub async fn next_event(events: &mut broadcast::Receiver<ScanEvent>) -> ScanEvent {
    tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("timed out waiting for scan event")
        .expect("event bus closed")
}

/// Collect events up to and including the first one matching `done`
pub async fn events_until(
    events: &mut broadcast::Receiver<ScanEvent>,
    done: impl Fn(&ScanEvent) -> bool,
) -> Vec<ScanEvent> {
    let mut seen = Vec::new();
    loop {
        let event = next_event(events).await;
        let finished = done(&event);
        seen.push(event);
        if finished {
            return seen;
        }
    }
}
