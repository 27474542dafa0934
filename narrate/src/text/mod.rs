//! Text processing: normalization and chunking for TTS.

pub mod chunker;
pub mod normalizer;

pub use chunker::chunk_text;
pub use normalizer::normalize;
