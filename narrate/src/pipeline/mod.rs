//! Conversion pipeline: drives text chunks through the speech backend in
//! strict order, accumulating audio and reporting progress.

pub mod batch;
pub mod package;
pub mod sink;

pub use sink::{AudioSink, FileSink, MemorySink};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tts_client::{SpeechBackend, SpeechEvent, SpeechOptions};

use crate::error::{NarrateError, Result};

/// Chunks completed so far out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.current as f64 / self.total as f64 * 100.0
        }
    }
}

/// Cooperative cancellation flag, honored at chunk boundaries only.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Settings for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Voice and rate passed through to the backend.
    pub speech: SpeechOptions,
    /// Pause after each completed chunk, to stay under the service's rate
    /// limits. Skipped on the aborting failure path.
    pub inter_chunk_delay: Duration,
}

impl ConvertOptions {
    pub fn new(speech: SpeechOptions) -> Self {
        Self {
            speech,
            inter_chunk_delay: Duration::from_millis(100),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }
}

/// Convert an ordered chunk sequence into one audio track.
///
/// Chunks are synthesized strictly in order, one streaming session each;
/// every audio event is appended to `sink` in arrival order. `on_progress`
/// fires once with `(0, total)` before work starts and again after each
/// completed chunk.
///
/// A failing chunk aborts the run immediately with the 1-based chunk index
/// and the underlying cause. Audio already written stays in the sink; there
/// is no rollback and no retry.
pub async fn convert_chunks(
    backend: &dyn SpeechBackend,
    chunks: &[String],
    options: &ConvertOptions,
    sink: &mut dyn AudioSink,
    mut on_progress: impl FnMut(Progress),
    cancel: &CancelFlag,
) -> Result<()> {
    let total = chunks.len();
    on_progress(Progress { current: 0, total });

    for (i, chunk) in chunks.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(NarrateError::Cancelled);
        }

        let index = i + 1;
        log::debug!("Synthesizing chunk {}/{} ({} bytes)", index, total, chunk.len());

        let mut stream = backend
            .open(chunk, &options.speech)
            .await
            .map_err(|source| NarrateError::ChunkSynthesisFailure {
                index,
                total,
                source,
            })?;

        loop {
            match stream.next_event().await {
                Ok(Some(SpeechEvent::Audio(bytes))) => sink.append(&bytes)?,
                Ok(Some(SpeechEvent::Metadata(_))) => {}
                Ok(None) => break,
                Err(source) => {
                    return Err(NarrateError::ChunkSynthesisFailure {
                        index,
                        total,
                        source,
                    });
                }
            }
        }

        on_progress(Progress {
            current: index,
            total,
        });

        if !options.inter_chunk_delay.is_zero() {
            tokio::time::sleep(options.inter_chunk_delay).await;
        }
    }

    Ok(())
}
