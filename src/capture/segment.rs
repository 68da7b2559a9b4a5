use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finalized utterance delivered by the speech service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Segment {
    pub fn new(start_ms: u64, end_ms: u64, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_ms,
            end_ms,
            text,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Everything captured during one recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub session_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub segments: Vec<Segment>,
    pub speech_duration_ms: u64,
}

impl CaptureRecord {
    pub fn new(source: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            source,
            started_at: Utc::now(),
            ended_at: None,
            segments: Vec::new(),
            speech_duration_ms: 0,
        }
    }

    pub fn add_segment(&mut self, segment: Segment) {
        self.speech_duration_ms += segment.duration_ms();
        self.segments.push(segment);
    }

    pub fn finalize(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    /// Final transcript: every non-empty segment, space separated
    pub fn transcript(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
