//! ZIP packaging of batch-converted chapters.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::batch::ChapterAudio;
use crate::error::Result;

/// Package converted chapters into a ZIP archive, one entry per chapter.
pub fn zip_chapters(chapters: &[ChapterAudio]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for chapter in chapters {
        writer.start_file(chapter.filename.as_str(), options)?;
        writer.write_all(&chapter.data)?;
    }

    Ok(writer.finish()?.into_inner())
}
