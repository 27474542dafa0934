//! EPUB chapter extraction.

use std::path::Path;

use crate::error::{NarrateError, Result};
use crate::text::normalize;

use super::{ChapterRecord, Document};

/// Chapters with less text than this are front matter, nav pages or
/// similar, and are skipped.
const MIN_CHAPTER_CHARS: usize = 50;

/// Parse an EPUB and extract its chapters in spine order.
pub fn extract_epub(path: &Path) -> Result<Document> {
    let mut doc = epub::doc::EpubDoc::new(path).map_err(|e| NarrateError::ExtractionFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let title = doc
        .mdata("title")
        .map(|m| m.value.clone())
        .unwrap_or_else(|| super::stem_title(path));

    let mut chapters = Vec::new();
    let spine = doc.spine.clone();

    for spine_item in spine.iter() {
        let Some((content_bytes, _mime)) = doc.get_resource(&spine_item.idref) else {
            continue;
        };
        let html = String::from_utf8_lossy(&content_bytes);

        let text = normalize(&html_to_text(&html));
        if text.len() < MIN_CHAPTER_CHARS {
            continue;
        }

        let id = chapters.len() + 1;
        let chapter_title =
            extract_heading(&html).unwrap_or_else(|| format!("Chapter {}", id));

        chapters.push(ChapterRecord {
            id,
            title: chapter_title,
            text,
        });
    }

    if chapters.is_empty() {
        return Err(NarrateError::ExtractionFailure {
            path: path.to_path_buf(),
            reason: "no readable chapters found".to_string(),
        });
    }

    Ok(Document { title, chapters })
}

/// Convert chapter HTML to plain text.
fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 1000)
}

/// First h1/h2/h3 heading in the chapter HTML, if any.
fn extract_heading(html: &str) -> Option<String> {
    let html_lower = html.to_lowercase();

    for tag in ["h1", "h2", "h3"] {
        let open = format!("<{}", tag);
        let close = format!("</{}>", tag);

        let Some(start) = html_lower.find(&open) else {
            continue;
        };
        let Some(tag_end) = html_lower[start..].find('>') else {
            continue;
        };
        let content_start = start + tag_end + 1;
        let Some(end) = html_lower[content_start..].find(&close) else {
            continue;
        };

        let heading = strip_tags(&html[content_start..content_start + end]);
        let heading = heading.trim();
        if !heading.is_empty() {
            return Some(heading.to_string());
        }
    }

    None
}

/// Strip markup from a heading fragment.
fn strip_tags(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
}
