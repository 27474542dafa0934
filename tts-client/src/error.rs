use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Could not retrieve voice catalog: {0}")]
    VoiceListUnavailable(String),

    #[error("Invalid rate modifier '{0}'. Use a signed percentage like \"+10%\" or \"-20%\"")]
    InvalidRate(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

pub type Result<T> = std::result::Result<T, TtsError>;
