//! Corpus loading and paragraph splitting.
//!
//! The input is a plain-text file with paragraphs separated by a blank line.
//! Chunk ids are the segment positions before empty segments are dropped, so
//! surviving ids may be non-contiguous; ids are positional and must stay
//! stable across re-ingestion of the same file.

use std::fs;
use std::path::Path;

use crate::errors::RagError;

/// One paragraph-level unit of source text to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: u64,
    pub text: String,
}

/// Read a corpus file and split it into paragraph chunks.
pub fn load_corpus(path: &Path) -> Result<Vec<Chunk>, RagError> {
    if !path.exists() {
        return Err(RagError::CorpusNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    Ok(split_paragraphs(&contents))
}

/// Split on double-newline boundaries, trim each segment, drop empties.
pub fn split_paragraphs(contents: &str) -> Vec<Chunk> {
    contents
        .split("\n\n")
        .enumerate()
        .filter_map(|(position, segment)| {
            let text = segment.trim();
            if text.is_empty() {
                None
            } else {
                Some(Chunk {
                    id: position as u64,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}
