//! Document text extraction.
//!
//! Turns a supported container format into plain chapter text for the
//! conversion pipeline. The pipeline itself never sees container formats,
//! only the `ChapterRecord`s produced here.

pub mod docx;
pub mod epub;
pub mod plain;

use std::path::Path;

use crate::error::{NarrateError, Result};

/// One structural unit of a multi-chapter document.
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    /// Sequential identifier, 1-based.
    pub id: usize,
    pub title: String,
    /// Normalized plain text.
    pub text: String,
}

/// A parsed document: title plus chapters in reading order.
#[derive(Debug)]
pub struct Document {
    pub title: String,
    pub chapters: Vec<ChapterRecord>,
}

impl Document {
    /// Whole-book text: chapters joined with blank lines.
    pub fn full_text(&self) -> String {
        self.chapters
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Approximate word count across all chapters.
    pub fn total_words(&self) -> usize {
        self.chapters
            .iter()
            .map(|c| c.text.split_whitespace().count())
            .sum()
    }
}

/// Extract a document, dispatching on the file extension.
pub fn extract(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(NarrateError::SourceNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "epub" => epub::extract_epub(path),
        "docx" => docx::extract_docx(path),
        "txt" | "md" => plain::extract_text(path),
        "html" | "htm" | "xhtml" => plain::extract_html(path),
        other => Err(NarrateError::ExtractionFailure {
            path: path.to_path_buf(),
            reason: format!("unsupported format '.{}'", other),
        }),
    }
}

/// Fallback title for an untitled document: the file stem.
pub(crate) fn stem_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}
