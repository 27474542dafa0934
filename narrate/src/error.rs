use std::path::PathBuf;
use thiserror::Error;
use tts_client::TtsError;

#[derive(Error, Debug)]
pub enum NarrateError {
    #[error("Input document not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Could not extract text from {}: {reason}", path.display())]
    ExtractionFailure { path: PathBuf, reason: String },

    #[error("Could not retrieve voice catalog: {0}")]
    VoiceListUnavailable(String),

    #[error(
        "Output file {} could not be cleared. Close it in other programs and retry.",
        path.display()
    )]
    OutputTargetLocked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Synthesis failed on part {index} of {total}: {source}")]
    ChunkSynthesisFailure {
        /// 1-based index of the failing chunk.
        index: usize,
        total: usize,
        #[source]
        source: TtsError,
    },

    #[error("Chapter {index} (\"{title}\") failed: {source}")]
    ChapterFailure {
        /// 1-based position in the selected chapter list.
        index: usize,
        title: String,
        #[source]
        source: Box<NarrateError>,
    },

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("ZIP packaging failed: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tts(#[from] TtsError),
}

pub type Result<T> = std::result::Result<T, NarrateError>;
