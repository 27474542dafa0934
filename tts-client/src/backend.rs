//! Speech backend trait and request types.

use async_trait::async_trait;

use crate::error::{Result, TtsError};

/// Options for one synthesis session.
#[derive(Debug, Clone)]
pub struct SpeechOptions {
    /// Voice short name (e.g. "en-US-AriaNeural")
    pub voice: String,
    /// Playback rate adjustment as a signed percentage (e.g. "+10%").
    /// None means the service default.
    pub rate: Option<String>,
}

impl SpeechOptions {
    /// Create options for the given voice with the default rate.
    pub fn new(voice: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            rate: None,
        }
    }

    /// Set the rate modifier.
    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    /// Rate string to send on the wire.
    pub fn rate_str(&self) -> &str {
        self.rate.as_deref().unwrap_or("+0%")
    }

    /// Check that the rate modifier is a signed percentage.
    pub fn validate(&self) -> Result<()> {
        let Some(rate) = self.rate.as_deref() else {
            return Ok(());
        };
        let valid = rate
            .strip_suffix('%')
            .and_then(|r| r.strip_prefix(['+', '-']))
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
        if valid {
            Ok(())
        } else {
            Err(TtsError::InvalidRate(rate.to_string()))
        }
    }
}

/// One event received from a synthesis stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// A piece of encoded audio, in arrival order.
    Audio(Vec<u8>),
    /// Non-audio service metadata (word boundaries etc). Callers may ignore it.
    Metadata(String),
}

/// A live synthesis session for one piece of text.
///
/// `next_event` pulls events until the service signals the end of the turn,
/// at which point it returns `Ok(None)`. Any transport or service error is
/// terminal for the session.
#[async_trait]
pub trait SpeechStream: Send {
    async fn next_event(&mut self) -> Result<Option<SpeechEvent>>;
}

/// Trait for speech synthesis backends.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Open a streaming synthesis session for one chunk of text.
    async fn open(&self, text: &str, options: &SpeechOptions) -> Result<Box<dyn SpeechStream>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_rate() {
        let opts = SpeechOptions::new("en-US-AriaNeural");
        assert_eq!(opts.rate_str(), "+0%");
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_options_valid_rates() {
        for rate in ["+10%", "-20%", "+0%", "-50%"] {
            let opts = SpeechOptions::new("en-US-GuyNeural").with_rate(rate);
            assert!(opts.validate().is_ok(), "rate {} should be valid", rate);
            assert_eq!(opts.rate_str(), rate);
        }
    }

    #[test]
    fn test_options_invalid_rates() {
        for rate in ["10%", "+10", "fast", "+%", "+1 0%", ""] {
            let opts = SpeechOptions::new("en-US-GuyNeural").with_rate(rate);
            assert!(opts.validate().is_err(), "rate {} should be invalid", rate);
        }
    }
}
