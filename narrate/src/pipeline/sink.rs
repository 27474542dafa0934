//! Output sinks for synthesized audio.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::error::{NarrateError, Result};

/// Ordered byte sink for synthesized audio.
pub trait AudioSink: Send {
    /// Append one audio payload. Byte order across calls is the audio track.
    fn append(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Sink that appends progressively to a file on disk.
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Create the sink, clearing any preexisting file of the same name.
    ///
    /// Runs before any synthesis work; if the existing file cannot be
    /// removed (open in another program) this fails with
    /// `OutputTargetLocked` and no network call is ever made.
    pub fn create(path: &Path) -> Result<Self> {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(NarrateError::OutputTargetLocked {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }

        let file = File::create(path).map_err(|source| NarrateError::OutputTargetLocked {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { file })
    }
}

impl AudioSink for FileSink {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)
    }
}

/// Sink that accumulates audio in memory for later packaging.
#[derive(Debug, Default)]
pub struct MemorySink {
    bytes: Vec<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AudioSink for MemorySink {
    fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }
}
