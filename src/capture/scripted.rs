use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::segment::Segment;
use super::session::CaptureEvent;

/// Assumed speaking rate used to give scripted segments plausible timestamps
const MS_PER_WORD: u64 = 400;

/// Replays a written conversation as if a speech service were recognising it.
///
/// Each non-empty line is one utterance. Every utterance is announced as
/// interim text first (its first half) and then as a final segment.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    utterances: Vec<String>,
    delay: Duration,
}

impl ScriptedSource {
    pub fn from_text(text: &str) -> Self {
        let utterances = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Self {
            utterances,
            delay: Duration::ZERO,
        }
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// Pause between utterances, to mimic live speech
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    /// Start emitting events. The task ends early when `stop_flag` is set
    /// or the receiver goes away, and always finishes with `Stopped`.
    pub fn spawn(
        self,
        tx: mpsc::Sender<CaptureEvent>,
        stop_flag: Arc<AtomicBool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(utterances = self.utterances.len(), "Scripted capture started");
            let mut clock_ms = 0u64;

            for utterance in self.utterances {
                if stop_flag.load(Ordering::SeqCst) {
                    debug!("Stop requested, ending scripted capture");
                    break;
                }

                let words: Vec<&str> = utterance.split_whitespace().collect();
                let partial = words[..words.len().div_ceil(2)].join(" ");
                if tx.send(CaptureEvent::Interim(partial)).await.is_err() {
                    return;
                }

                let end_ms = clock_ms + words.len() as u64 * MS_PER_WORD;
                let segment = Segment::new(clock_ms, end_ms, utterance);
                clock_ms = end_ms;
                if tx.send(CaptureEvent::Final(segment)).await.is_err() {
                    return;
                }

                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
            }

            let _ = tx.send(CaptureEvent::Stopped).await;
            info!("Scripted capture finished");
        })
    }
}
