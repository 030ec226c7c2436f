//! Scanner session manager
//!
//! Each session runs as one tokio task that owns the camera stream, the
//! decoder feed and any in-flight lookup. Callers talk to it through a
//! [`ScannerHandle`]; results are published on the session's [`EventBus`].
//!
//! ```text
//! Idle -> Initializing -> Scanning -> Resolving -> Closed
//!            |               |           |
//!            +----> Error <--+           +--> Scanning (not found / lookup error)
//!                     |
//!                     +-- retry --> Initializing
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    config::ScannerConfig,
    error::ScanError,
    media::{CodeDecoder, DecodeFeed, MediaDevices, MediaStream},
    models::{
        DecodeEvent, DeviceId, EquipmentRecord, ScanEvent, ScanResult, SessionSnapshot,
        SessionState,
    },
    services::{device_selection, events::EventBus, lookup::LookupService},
};

type LookupFuture = Pin<Box<dyn Future<Output = Result<EquipmentRecord, ScanError>> + Send>>;

/// Opens scanner sessions over a fixed set of collaborators
#[derive(Clone)]
pub struct ScannerService {
    media: Arc<dyn MediaDevices>,
    decoder: Arc<dyn CodeDecoder>,
    lookup: LookupService,
    config: ScannerConfig,
}

impl ScannerService {
    pub fn new(
        media: Arc<dyn MediaDevices>,
        decoder: Arc<dyn CodeDecoder>,
        lookup: LookupService,
        config: ScannerConfig,
    ) -> Self {
        Self {
            media,
            decoder,
            lookup,
            config,
        }
    }

    /// Spawn a new session in the `Idle` state. Must be called inside a tokio runtime.
    pub fn open_session(&self) -> ScannerHandle {
        let id = Uuid::new_v4();
        let events = EventBus::new(self.config.event_capacity);
        let cancel = CancellationToken::new();
        let (commands, receiver) = mpsc::channel(self.config.command_capacity);

        let session = Session {
            id,
            media: Arc::clone(&self.media),
            decoder: Arc::clone(&self.decoder),
            lookup: self.lookup.clone(),
            config: self.config.clone(),
            events: events.clone(),
            cancel: cancel.clone(),
            state: SessionState::Idle,
            error: None,
            selected_device: None,
            stream: None,
            feed: None,
            pending: None,
            cooldown_until: None,
        };

        let span = tracing::info_span!("scanner_session", session_id = %id);
        let task = tokio::spawn(session.run(receiver).instrument(span));

        ScannerHandle {
            session_id: id,
            commands,
            events,
            cancel,
            task: Some(task),
        }
    }
}

enum Command {
    Start {
        retry: bool,
        reply: oneshot::Sender<Result<(), ScanError>>,
    },
    Manual {
        code: String,
        reply: oneshot::Sender<Result<ScanResult, ScanError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Caller side of a scanner session. Dropping it closes the session.
#[derive(Debug)]
pub struct ScannerHandle {
    session_id: Uuid,
    commands: mpsc::Sender<Command>,
    events: EventBus,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ScannerHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Acquire a camera and begin decoding
    pub async fn start(&self) -> Result<(), ScanError> {
        self.request(|reply| Command::Start { retry: false, reply }).await?
    }

    /// Leave the `Error` state by re-running camera initialisation
    pub async fn retry(&self) -> Result<(), ScanError> {
        self.request(|reply| Command::Start { retry: true, reply }).await?
    }

    /// Resolve a typed code without touching the camera.
    ///
    /// Returns once the lookup completes. An `Err` means the entry was
    /// rejected (empty, or another lookup in flight).
    pub async fn submit_manual(&self, code: &str) -> Result<ScanResult, ScanError> {
        let code = code.to_string();
        self.request(|reply| Command::Manual { code, reply }).await?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, ScanError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stop the camera and wait for the session task to finish
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(session_id = %self.session_id, "Scanner session task failed: {}", e);
            }
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ScanError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| ScanError::SessionClosed)?;
        response.await.map_err(|_| ScanError::SessionClosed)
    }
}

impl Drop for ScannerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct PendingLookup {
    code: String,
    reply: Option<oneshot::Sender<Result<ScanResult, ScanError>>>,
    future: LookupFuture,
}

struct Session {
    id: Uuid,
    media: Arc<dyn MediaDevices>,
    decoder: Arc<dyn CodeDecoder>,
    lookup: LookupService,
    config: ScannerConfig,
    events: EventBus,
    cancel: CancellationToken,
    state: SessionState,
    error: Option<ScanError>,
    selected_device: Option<DeviceId>,
    stream: Option<Box<dyn MediaStream>>,
    feed: Option<DecodeFeed>,
    /// Re-entrancy guard: at most one resolution at a time
    pending: Option<PendingLookup>,
    cooldown_until: Option<Instant>,
}

impl Session {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!("Scanner session opened");
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                outcome = pending_outcome(&mut self.pending) => self.finish_lookup(outcome),
                frame = next_frame(&mut self.feed) => self.handle_frame(frame),
            }

            if self.state == SessionState::Closed {
                break;
            }
        }

        self.shutdown();
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { retry, reply } => {
                let result = self.start(retry).await;
                let _ = reply.send(result);
            }
            Command::Manual { code, reply } => self.submit_manual(code, reply),
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    async fn start(&mut self, retry: bool) -> Result<(), ScanError> {
        let action = if retry { "retry" } else { "start" };
        match (self.state, retry) {
            (SessionState::Idle, false) | (SessionState::Error, true) => {}
            (SessionState::Scanning, false) => return Ok(()),
            (state, _) => {
                return Err(ScanError::InvalidState {
                    action,
                    state: state.to_string(),
                })
            }
        }

        self.error = None;
        self.set_state(SessionState::Initializing);

        let acquired = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ScanError::SessionClosed),
            result = device_selection::acquire_preferred_camera(
                self.media.as_ref(),
                &self.config.rear_camera_keywords,
            ) => result,
        };
        let mut stream = match acquired {
            Ok(stream) => stream,
            Err(e) => return Err(self.fail(e)),
        };

        let feed = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                stream.stop();
                return Err(ScanError::SessionClosed);
            }
            result = self.decoder.decode_continuous(stream.as_ref()) => result,
        };

        match feed {
            Ok(feed) => {
                tracing::info!(device = %stream.device_id(), "Camera acquired, decoding");
                self.selected_device = Some(stream.device_id().clone());
                self.stream = Some(stream);
                self.feed = Some(feed);
                self.cooldown_until = None;
                self.set_state(SessionState::Scanning);
                Ok(())
            }
            Err(e) => {
                stream.stop();
                Err(self.fail(e.into()))
            }
        }
    }

    fn submit_manual(
        &mut self,
        code: String,
        reply: oneshot::Sender<Result<ScanResult, ScanError>>,
    ) {
        if self.pending.is_some() {
            let _ = reply.send(Err(ScanError::ResolutionInFlight));
            return;
        }
        if code.trim().is_empty() {
            let _ = reply.send(Err(ScanError::EmptyCode));
            return;
        }
        self.begin_lookup(code, Some(reply));
    }

    fn handle_frame(&mut self, frame: Option<DecodeEvent>) {
        match frame {
            Some(DecodeEvent::Miss) => {}
            Some(DecodeEvent::Decoded(text)) => {
                if self.pending.is_some() || self.cooling_down() {
                    tracing::trace!(code = %text, "Decode ignored while handling a scan");
                    return;
                }
                if text.trim().is_empty() {
                    return;
                }
                tracing::debug!(code = %text, "Code decoded");
                self.begin_lookup(text, None);
            }
            Some(DecodeEvent::Fatal(reason)) => {
                self.fail(ScanError::Decoder(reason));
            }
            None => {
                self.fail(ScanError::Decoder("decode feed ended".to_string()));
            }
        }
    }

    fn begin_lookup(
        &mut self,
        code: String,
        reply: Option<oneshot::Sender<Result<ScanResult, ScanError>>>,
    ) {
        let lookup = self.lookup.clone();
        let query = code.clone();
        self.pending = Some(PendingLookup {
            code,
            reply,
            future: Box::pin(async move { lookup.resolve(&query).await }),
        });
        self.set_state(SessionState::Resolving);
    }

    fn finish_lookup(&mut self, outcome: Result<EquipmentRecord, ScanError>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.cooldown_until = Some(Instant::now() + self.config.cooldown());

        let result = match outcome {
            Ok(record) => {
                self.events.publish(ScanEvent::EquipmentFound(record.clone()));
                self.release();
                self.set_state(SessionState::Closed);
                ScanResult::EquipmentFound(record)
            }
            Err(ScanError::LookupNotFound { code }) => {
                self.events.publish(ScanEvent::NotFound { code });
                self.set_state(self.resume_state());
                ScanResult::NotFound
            }
            Err(e) => {
                tracing::warn!(code = %pending.code, error = %e, "Resolution failed");
                self.events.publish(ScanEvent::Error(e.clone()));
                self.set_state(self.resume_state());
                ScanResult::Error(e)
            }
        };

        if let Some(reply) = pending.reply {
            let _ = reply.send(Ok(result));
        }
    }

    /// State to fall back to after a lookup that did not close the session
    fn resume_state(&self) -> SessionState {
        if self.feed.is_some() {
            SessionState::Scanning
        } else if self.error.is_some() {
            SessionState::Error
        } else {
            SessionState::Idle
        }
    }

    fn cooling_down(&self) -> bool {
        self.cooldown_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// Release the camera, record the error and halt until retry
    fn fail(&mut self, error: ScanError) -> ScanError {
        tracing::warn!(code = error.code(), "Scanner error: {}", error);
        self.release();
        self.error = Some(error.clone());
        self.events.publish(ScanEvent::Error(error.clone()));
        if self.pending.is_none() {
            self.set_state(SessionState::Error);
        }
        error
    }

    /// Stop every track and drop the decoder feed together
    fn release(&mut self) {
        self.feed = None;
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::debug!(device = %stream.device_id(), "Camera released");
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "Scanner state changed");
        self.state = state;
        self.events.publish(ScanEvent::StateChanged(state));
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            state: self.state,
            scanning: self.feed.is_some(),
            error: self.error.clone(),
            selected_device: self.selected_device.clone(),
            handling_scan: self.pending.is_some(),
        }
    }

    fn shutdown(&mut self) {
        // Dropping the pending lookup cancels it; its caller sees SessionClosed.
        self.pending = None;
        self.release();
        self.set_state(SessionState::Closed);
        tracing::debug!("Scanner session closed");
    }
}

async fn pending_outcome(pending: &mut Option<PendingLookup>) -> Result<EquipmentRecord, ScanError> {
    match pending {
        Some(pending) => (&mut pending.future).await,
        None => std::future::pending().await,
    }
}

async fn next_frame(feed: &mut Option<DecodeFeed>) -> Option<DecodeEvent> {
    match feed {
        Some(feed) => feed.next().await,
        None => std::future::pending().await,
    }
}
