//! Mock speech backend for testing.
//!
//! Lets orchestration tests script per-chunk outcomes: a successful stream of
//! audio frames, or a stream that yields some frames and then fails.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{SpeechBackend, SpeechEvent, SpeechOptions, SpeechStream};
use crate::error::{Result, TtsError};

/// Scripted outcome for one `open()` call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Yield these events, then end the stream normally.
    Success(Vec<SpeechEvent>),
    /// Yield these events, then fail with the given message.
    FailAfter(Vec<SpeechEvent>, String),
    /// Fail immediately when the session is opened.
    FailToOpen(String),
}

/// A mock backend that replays scripted outcomes in order.
#[derive(Debug, Default)]
pub struct MockBackend {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    call_count: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful stream of raw audio payloads.
    pub fn push_audio(&self, frames: &[&[u8]]) {
        let events = frames
            .iter()
            .map(|f| SpeechEvent::Audio(f.to_vec()))
            .collect();
        self.push(MockOutcome::Success(events));
    }

    /// Queue an arbitrary outcome.
    pub fn push(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Number of sessions opened so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts passed to `open`, in order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn open(&self, text: &str, options: &SpeechOptions) -> Result<Box<dyn SpeechStream>> {
        options.validate()?;
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockOutcome::Success(vec![SpeechEvent::Audio(b"mock".to_vec())]));

        match outcome {
            MockOutcome::FailToOpen(message) => Err(TtsError::Synthesis(message)),
            MockOutcome::Success(events) => Ok(Box::new(MockStream {
                events: events.into(),
                fail_with: None,
            })),
            MockOutcome::FailAfter(events, message) => Ok(Box::new(MockStream {
                events: events.into(),
                fail_with: Some(message),
            })),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockStream {
    events: VecDeque<SpeechEvent>,
    fail_with: Option<String>,
}

#[async_trait]
impl SpeechStream for MockStream {
    async fn next_event(&mut self) -> Result<Option<SpeechEvent>> {
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        match self.fail_with.take() {
            Some(message) => Err(TtsError::Synthesis(message)),
            None => Ok(None),
        }
    }
}
