use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::segment::{CaptureRecord, Segment};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    Idle,
    Recording,
    Paused,
    Stopping,
    Completed,
    Error,
}

/// Errors raised by the microphone or speech service
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CaptureError {
    #[error("Microphone access was denied. Please allow microphone access and try again.")]
    PermissionDenied,
    #[error("No microphone found. Please connect a microphone and try again.")]
    DeviceNotFound,
    #[error("Microphone is already in use by another application.")]
    DeviceBusy,
    #[error("Speech recognition is not supported on this system.")]
    Unsupported,
    #[error("No speech detected. Please speak clearly into the microphone.")]
    NoSpeech,
    #[error("Network error occurred. Please check your internet connection.")]
    Network,
    #[error("Speech recognition error: {0}")]
    Other(String),
}

impl CaptureError {
    /// Whether the session has to end. Silence is reported but recording goes on.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NoSpeech)
    }
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),
}

/// Notification from the speech service
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// Partial text for live display; never part of the final transcript
    Interim(String),
    /// Recognised utterance
    Final(Segment),
    /// Microphone or recognition failure
    Error(CaptureError),
    /// Source has delivered everything it will deliver
    Stopped,
}

/// Recording lifecycle: collects final segments between start and stop and
/// hands out the finished transcript exactly once.
pub struct CaptureSession {
    state: CaptureState,
    record: Option<CaptureRecord>,
    interim: String,
    stop_flag: Arc<AtomicBool>,
    error: Option<CaptureError>,
    dropped_while_paused: usize,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            record: None,
            interim: String::new(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            error: None,
            dropped_while_paused: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn error(&self) -> Option<&CaptureError> {
        self.error.as_ref()
    }

    /// Latest partial text, for display only
    pub fn interim_text(&self) -> &str {
        &self.interim
    }

    pub fn dropped_while_paused(&self) -> usize {
        self.dropped_while_paused
    }

    pub fn record(&self) -> Option<&CaptureRecord> {
        self.record.as_ref()
    }

    /// Begin a new recording. Returns the flag the source watches for stop.
    pub fn start(&mut self, source: &str) -> Result<Arc<AtomicBool>, SessionError> {
        match self.state {
            CaptureState::Idle | CaptureState::Completed | CaptureState::Error => {}
            other => {
                return Err(SessionError::InvalidTransition(format!(
                    "Cannot start from state {:?}",
                    other
                )))
            }
        }

        info!(source = %source, "Capture session starting");
        self.state = CaptureState::Recording;
        self.record = Some(CaptureRecord::new(source.to_string()));
        self.interim.clear();
        self.error = None;
        self.dropped_while_paused = 0;
        self.stop_flag = Arc::new(AtomicBool::new(false));
        Ok(self.stop_flag.clone())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != CaptureState::Recording {
            return Err(SessionError::InvalidTransition(format!(
                "Cannot pause from state {:?}",
                self.state
            )));
        }
        info!("Capture paused");
        self.state = CaptureState::Paused;
        self.interim.clear();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != CaptureState::Paused {
            return Err(SessionError::InvalidTransition(format!(
                "Cannot resume from state {:?}",
                self.state
            )));
        }
        info!("Capture resumed");
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Ask the source to stop. Segments already in flight are still accepted.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        match self.state {
            CaptureState::Recording | CaptureState::Paused => {
                info!("Capture stopping");
                self.state = CaptureState::Stopping;
                self.stop_flag.store(true, Ordering::SeqCst);
                Ok(())
            }
            other => Err(SessionError::InvalidTransition(format!(
                "Cannot stop from state {:?}",
                other
            ))),
        }
    }

    /// Apply one event. Returns true once the source is done.
    pub fn handle_event(&mut self, event: CaptureEvent) -> bool {
        match event {
            CaptureEvent::Interim(text) => {
                if self.state == CaptureState::Recording {
                    self.interim = text;
                }
                false
            }
            CaptureEvent::Final(segment) => {
                self.interim.clear();
                match (self.state, self.record.as_mut()) {
                    (CaptureState::Recording | CaptureState::Stopping, Some(record)) => {
                        debug!(
                            start_ms = segment.start_ms,
                            end_ms = segment.end_ms,
                            "Final segment received"
                        );
                        record.add_segment(segment);
                    }
                    (CaptureState::Paused, _) => {
                        self.dropped_while_paused += 1;
                        debug!("Segment dropped while paused");
                    }
                    (state, _) => {
                        warn!(state = ?state, "Segment received outside a recording");
                    }
                }
                false
            }
            CaptureEvent::Error(error) if !error.is_fatal() => {
                warn!("{}", error);
                false
            }
            CaptureEvent::Error(error) => {
                warn!("Capture error: {}", error);
                self.stop_flag.store(true, Ordering::SeqCst);
                self.state = CaptureState::Error;
                self.error = Some(error);
                true
            }
            CaptureEvent::Stopped => {
                if matches!(self.state, CaptureState::Recording | CaptureState::Paused) {
                    self.state = CaptureState::Stopping;
                }
                true
            }
        }
    }

    /// Close the session and take the final transcript. Only one call per
    /// recording succeeds.
    pub fn finalize(&mut self) -> Result<String, SessionError> {
        if let Some(error) = &self.error {
            return Err(SessionError::Capture(error.clone()));
        }
        if self.state != CaptureState::Stopping {
            return Err(SessionError::InvalidTransition(format!(
                "Cannot finalize from state {:?}",
                self.state
            )));
        }

        let mut record = self.record.take().ok_or_else(|| {
            SessionError::InvalidTransition("No capture record to finalize".to_string())
        })?;
        record.finalize();
        let transcript = record.transcript();

        info!(
            session_id = %record.session_id,
            segments = record.segments.len(),
            speech_ms = record.speech_duration_ms,
            dropped_while_paused = self.dropped_while_paused,
            "Capture session finalized"
        );

        self.record = Some(record);
        self.state = CaptureState::Completed;
        Ok(transcript)
    }

    /// Consume events until the source stops, then finalize.
    pub async fn drive(
        &mut self,
        rx: &mut mpsc::Receiver<CaptureEvent>,
    ) -> Result<String, SessionError> {
        loop {
            match rx.recv().await {
                Some(event) => {
                    if self.handle_event(event) {
                        break;
                    }
                }
                None => {
                    debug!("Capture channel closed");
                    self.handle_event(CaptureEvent::Stopped);
                    break;
                }
            }
        }
        self.finalize()
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> CaptureEvent {
        CaptureEvent::Final(Segment::new(0, 1000, text.to_string()))
    }

    #[test]
    fn test_initial_state() {
        let session = CaptureSession::new();
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.record().is_none());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = CaptureSession::new();
        assert!(session.pause().is_err());
        assert!(session.resume().is_err());
        assert!(session.stop().is_err());
        session.start("test").unwrap();
        assert!(session.start("test").is_err());
        assert!(session.resume().is_err());
    }

    #[test]
    fn test_stop_sets_flag() {
        let mut session = CaptureSession::new();
        let flag = session.start("test").unwrap();
        assert!(!flag.load(Ordering::SeqCst));
        session.stop().unwrap();
        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(session.state(), CaptureState::Stopping);
    }

    #[test]
    fn test_interim_never_reaches_transcript() {
        let mut session = CaptureSession::new();
        session.start("test").unwrap();
        session.handle_event(CaptureEvent::Interim("I have a".to_string()));
        assert_eq!(session.interim_text(), "I have a");
        session.handle_event(seg("I have a cough."));
        session.handle_event(CaptureEvent::Interim("and a fev".to_string()));
        session.handle_event(CaptureEvent::Stopped);

        assert_eq!(session.finalize().unwrap(), "I have a cough.");
    }

    #[test]
    fn test_segments_dropped_while_paused() {
        let mut session = CaptureSession::new();
        session.start("test").unwrap();
        session.handle_event(seg("One."));
        session.pause().unwrap();
        session.handle_event(seg("Off the record."));
        session.resume().unwrap();
        session.handle_event(seg("Two."));
        session.stop().unwrap();
        session.handle_event(CaptureEvent::Stopped);

        assert_eq!(session.dropped_while_paused(), 1);
        assert_eq!(session.finalize().unwrap(), "One. Two.");
    }

    #[test]
    fn test_finalize_only_once() {
        let mut session = CaptureSession::new();
        session.start("test").unwrap();
        session.handle_event(seg("Hello."));
        session.stop().unwrap();
        assert!(session.finalize().is_ok());
        assert_eq!(session.state(), CaptureState::Completed);
        assert!(session.finalize().is_err());
    }

    #[test]
    fn test_fatal_error_ends_session() {
        let mut session = CaptureSession::new();
        let flag = session.start("test").unwrap();
        assert!(session.handle_event(CaptureEvent::Error(CaptureError::PermissionDenied)));
        assert_eq!(session.state(), CaptureState::Error);
        assert!(flag.load(Ordering::SeqCst));
        assert!(matches!(
            session.finalize(),
            Err(SessionError::Capture(CaptureError::PermissionDenied))
        ));
        // A new recording may start after an error
        assert!(session.start("test").is_ok());
    }

    #[test]
    fn test_no_speech_is_not_fatal() {
        let mut session = CaptureSession::new();
        session.start("test").unwrap();
        assert!(!session.handle_event(CaptureEvent::Error(CaptureError::NoSpeech)));
        assert_eq!(session.state(), CaptureState::Recording);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CaptureError::DeviceBusy.to_string(),
            "Microphone is already in use by another application."
        );
        assert_eq!(
            CaptureError::Other("aborted".to_string()).to_string(),
            "Speech recognition error: aborted"
        );
    }

    #[tokio::test]
    async fn test_drive_collects_until_stopped() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut session = CaptureSession::new();
        session.start("test").unwrap();

        tx.send(CaptureEvent::Interim("Take".to_string())).await.unwrap();
        tx.send(seg("Take Ibuprofen.")).await.unwrap();
        tx.send(seg("Come back Friday.")).await.unwrap();
        tx.send(CaptureEvent::Stopped).await.unwrap();

        let transcript = session.drive(&mut rx).await.unwrap();
        assert_eq!(transcript, "Take Ibuprofen. Come back Friday.");
        assert_eq!(session.state(), CaptureState::Completed);
    }

    #[tokio::test]
    async fn test_drive_treats_closed_channel_as_stop() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut session = CaptureSession::new();
        session.start("test").unwrap();
        tx.send(seg("Only this.")).await.unwrap();
        drop(tx);

        assert_eq!(session.drive(&mut rx).await.unwrap(), "Only this.");
    }

    #[tokio::test]
    async fn test_drive_surfaces_capture_error() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut session = CaptureSession::new();
        session.start("test").unwrap();
        tx.send(CaptureEvent::Error(CaptureError::DeviceNotFound)).await.unwrap();

        let result = session.drive(&mut rx).await;
        assert!(matches!(
            result,
            Err(SessionError::Capture(CaptureError::DeviceNotFound))
        ));
    }
}
