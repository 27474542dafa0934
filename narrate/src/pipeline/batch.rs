//! Per-chapter batch conversion.
//!
//! Runs the conversion pipeline once per selected chapter, collecting each
//! chapter's audio under a generated filename for packaging.

use tts_client::SpeechBackend;

use super::{CancelFlag, ConvertOptions, MemorySink, Progress, convert_chunks};
use crate::error::{NarrateError, Result};
use crate::extract::ChapterRecord;
use crate::text::chunk_text;

/// Sanitized titles are truncated to this many characters.
pub const TITLE_MAX_LEN: usize = 30;

/// One converted chapter, ready for packaging.
#[derive(Debug, Clone)]
pub struct ChapterAudio {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Strip everything but ASCII letters, digits and spaces from a chapter
/// title, then truncate to [`TITLE_MAX_LEN`] characters.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .take(TITLE_MAX_LEN)
        .collect()
}

/// Filename for the `seq`-th converted chapter (1-based).
pub fn chapter_filename(seq: usize, title: &str, ext: &str) -> String {
    format!("{:02} - {}.{}", seq, sanitize_title(title), ext)
}

/// Converts a list of selected chapters one at a time, each chunked
/// independently, and collects the named outputs.
///
/// A chapter failure aborts the remaining batch; outputs of chapters that
/// already completed stay available through [`outputs`](Self::outputs),
/// matching the pipeline's no-rollback contract.
pub struct BatchCoordinator<'a> {
    backend: &'a dyn SpeechBackend,
    options: ConvertOptions,
    chunk_max: usize,
    outputs: Vec<ChapterAudio>,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(backend: &'a dyn SpeechBackend, options: ConvertOptions, chunk_max: usize) -> Self {
        Self {
            backend,
            options,
            chunk_max,
            outputs: Vec::new(),
        }
    }

    /// Run the batch. `on_progress` reports chapters completed out of the
    /// total, independent of per-chunk progress within a chapter.
    pub async fn run(
        &mut self,
        chapters: &[ChapterRecord],
        mut on_progress: impl FnMut(Progress),
        cancel: &CancelFlag,
    ) -> Result<()> {
        let total = chapters.len();
        on_progress(Progress { current: 0, total });

        for (i, chapter) in chapters.iter().enumerate() {
            let seq = i + 1;
            log::debug!("Converting chapter {}/{}: {}", seq, total, chapter.title);

            let chunks = chunk_text(&chapter.text, self.chunk_max);
            let mut sink = MemorySink::new();
            convert_chunks(
                self.backend,
                &chunks,
                &self.options,
                &mut sink,
                |_| {},
                cancel,
            )
            .await
            .map_err(|source| match source {
                // Cancellation is the user's doing, not a chapter failure
                NarrateError::Cancelled => NarrateError::Cancelled,
                source => NarrateError::ChapterFailure {
                    index: seq,
                    title: chapter.title.clone(),
                    source: Box::new(source),
                },
            })?;

            self.outputs.push(ChapterAudio {
                filename: chapter_filename(seq, &chapter.title, "mp3"),
                data: sink.into_bytes(),
            });
            on_progress(Progress {
                current: seq,
                total,
            });
        }

        Ok(())
    }

    /// Outputs of every chapter completed so far, in order.
    pub fn outputs(&self) -> &[ChapterAudio] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<ChapterAudio> {
        self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tts_client::mock::MockOutcome;
    use tts_client::{MockBackend, SpeechOptions};

    fn options() -> ConvertOptions {
        ConvertOptions::new(SpeechOptions::new("en-US-AriaNeural"))
            .with_delay(Duration::ZERO)
    }

    fn chapter(id: usize, title: &str, text: &str) -> ChapterRecord {
        ChapterRecord {
            id,
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Chapter 1: The Start!"), "Chapter 1 The Start");
        assert_eq!(sanitize_title("Café & Crème"), "Caf  Crme");
        assert_eq!(sanitize_title(""), "");
    }

    #[test]
    fn test_sanitize_title_truncates() {
        let long = "x".repeat(80);
        assert_eq!(sanitize_title(&long).len(), TITLE_MAX_LEN);
    }

    #[test]
    fn test_chapter_filename() {
        assert_eq!(chapter_filename(3, "The End?", "mp3"), "03 - The End.mp3");
        assert_eq!(chapter_filename(12, "Intro", "mp3"), "12 - Intro.mp3");
    }

    #[tokio::test]
    async fn test_batch_collects_named_outputs() {
        let backend = MockBackend::new();
        backend.push_audio(&[b"first"]);
        backend.push_audio(&[b"second"]);

        let mut coordinator = BatchCoordinator::new(&backend, options(), 2500);
        let chapters = [chapter(1, "Intro", "Hello."), chapter(2, "Body", "World.")];

        let mut seen = Vec::new();
        coordinator
            .run(&chapters, |p| seen.push((p.current, p.total)), &CancelFlag::new())
            .await
            .unwrap();

        let outputs = coordinator.into_outputs();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].filename, "01 - Intro.mp3");
        assert_eq!(outputs[0].data, b"first");
        assert_eq!(outputs[1].filename, "02 - Body.mp3");
        assert_eq!(outputs[1].data, b"second");
        assert_eq!(seen, vec![(0, 2), (1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_chapter_failure_aborts_but_keeps_completed() {
        let backend = MockBackend::new();
        backend.push_audio(&[b"good"]);
        backend.push(MockOutcome::FailToOpen("backend rejected".to_string()));

        let mut coordinator = BatchCoordinator::new(&backend, options(), 2500);
        let chapters = [
            chapter(1, "One", "First."),
            chapter(2, "Two", "Second."),
            chapter(3, "Three", "Third."),
        ];

        let err = coordinator
            .run(&chapters, |_| {}, &CancelFlag::new())
            .await
            .unwrap_err();

        match err {
            NarrateError::ChapterFailure { index, title, .. } => {
                assert_eq!(index, 2);
                assert_eq!(title, "Two");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(coordinator.outputs().len(), 1);
        assert_eq!(coordinator.outputs()[0].filename, "01 - One.mp3");
        // Chapter 3 never attempted
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_is_not_a_chapter_failure() {
        let backend = MockBackend::new();
        backend.push_audio(&[b"good"]);

        let mut coordinator = BatchCoordinator::new(&backend, options(), 2500);
        let chapters = [chapter(1, "One", "First."), chapter(2, "Two", "Second.")];

        // Request cancellation once the first chapter completes
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let err = coordinator
            .run(
                &chapters,
                |p| {
                    if p.current == 1 {
                        flag.cancel();
                    }
                },
                &cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, NarrateError::Cancelled));
        assert_eq!(coordinator.outputs().len(), 1);
    }

    #[tokio::test]
    async fn test_each_chapter_chunked_independently() {
        let backend = MockBackend::new();
        // Chapter text splits into two chunks at max 10; two sessions expected
        let mut coordinator = BatchCoordinator::new(&backend, options(), 10);
        let chapters = [chapter(1, "Long", "Alpha. Beta gam.")];

        coordinator
            .run(&chapters, |_| {}, &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.texts(), vec!["Alpha.".to_string(), "Beta gam.".to_string()]);
    }
}
