//! Plain text, Markdown and HTML extraction.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::text::normalize;

use super::{ChapterRecord, Document};

/// Read a text or Markdown file as a single-chapter document.
pub fn extract_text(path: &Path) -> Result<Document> {
    let raw = fs::read(path)?;
    let text = String::from_utf8_lossy(&raw);
    single_chapter(path, normalize(&text))
}

/// Read an HTML file, converting markup to plain text first.
pub fn extract_html(path: &Path) -> Result<Document> {
    let raw = fs::read(path)?;
    let html = String::from_utf8_lossy(&raw);
    let text = html2text::from_read(html.as_bytes(), 1000);
    single_chapter(path, normalize(&text))
}

fn single_chapter(path: &Path, text: String) -> Result<Document> {
    let title = super::stem_title(path);
    Ok(Document {
        chapters: vec![ChapterRecord {
            id: 1,
            title: title.clone(),
            text,
        }],
        title,
    })
}
