//! DOCX text extraction.

use std::path::Path;

use docx_rust::DocxFile;
use docx_rust::document::{BodyContent, ParagraphContent, RunContent};

use crate::error::{NarrateError, Result};
use crate::text::normalize;

use super::{ChapterRecord, Document};

/// Extract a DOCX as a single-chapter document.
pub fn extract_docx(path: &Path) -> Result<Document> {
    let file = DocxFile::from_file(path).map_err(|e| NarrateError::ExtractionFailure {
        path: path.to_path_buf(),
        reason: format!("{}", e),
    })?;
    let docx = file.parse().map_err(|e| NarrateError::ExtractionFailure {
        path: path.to_path_buf(),
        reason: format!("{}", e),
    })?;

    let mut paragraphs = Vec::new();
    for content in &docx.document.body.content {
        if let BodyContent::Paragraph(para) = content {
            let text = paragraph_text(para);
            if !text.trim().is_empty() {
                paragraphs.push(text);
            }
        }
    }

    let text = normalize(&paragraphs.join("\n"));
    if text.is_empty() {
        return Err(NarrateError::ExtractionFailure {
            path: path.to_path_buf(),
            reason: "document contains no text".to_string(),
        });
    }

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

/// Plain text of one paragraph's runs.
fn paragraph_text(para: &docx_rust::document::Paragraph) -> String {
    let mut text = String::new();

    for pc in &para.content {
        if let ParagraphContent::Run(run) = pc {
            for rc in &run.content {
                match rc {
                    RunContent::Text(t) => text.push_str(&t.text),
                    RunContent::Break(_) => text.push('\n'),
                    RunContent::Tab(_) => text.push(' '),
                    _ => {}
                }
            }
        }
    }

    text
}
