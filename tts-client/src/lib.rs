//! Streaming TTS client for the narrate workspace.
//!
//! Wraps the Microsoft Edge "read aloud" speech service:
//! - Voice catalog retrieval over HTTPS
//! - Streaming synthesis over WebSocket (one session per text chunk)
//! - A `SpeechBackend` trait so callers can swap the transport in tests

pub mod backend;
pub mod edge;
pub mod error;
pub mod mock;
pub mod protocol;
pub mod voice;

pub use backend::{SpeechBackend, SpeechEvent, SpeechOptions, SpeechStream};
pub use edge::EdgeBackend;
pub use error::{Result, TtsError};
pub use mock::MockBackend;
pub use voice::{Voice, list_voices};
