//! Document loading boundary.
//!
//! Document-to-text extraction is external to the retrieval core: a loader
//! just produces an ordered sequence of page texts. The bundled
//! [`TextDocumentLoader`] reads a plain-text file and treats form feeds as
//! page breaks, which is what common `pdftotext`-style extractors emit;
//! richer extractors plug in behind the same trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::types::Page;

#[derive(Debug, Error)]
pub enum DocumentLoadError {
    #[error("document not found at {0}")]
    NotFound(PathBuf),

    #[error("failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Produces the ordered page texts for a document path.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Vec<Page>, DocumentLoadError>;
}

/// Loads a UTF-8 text file, splitting pages on form feed characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextDocumentLoader;

#[async_trait]
impl DocumentLoader for TextDocumentLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Page>, DocumentLoadError> {
        if !path.exists() {
            return Err(DocumentLoadError::NotFound(path.to_path_buf()));
        }

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DocumentLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let pages: Vec<Page> = text
            .split('\u{0c}')
            .enumerate()
            .map(|(index, page_text)| Page::new(index, page_text))
            .collect();

        debug!(path = %path.display(), pages = pages.len(), "document loaded");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let loader = TextDocumentLoader;
        let result = loader.load(Path::new("/nonexistent/document.txt")).await;
        assert!(matches!(result, Err(DocumentLoadError::NotFound(_))));
    }

    #[tokio::test]
    async fn form_feeds_split_pages_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first page\u{0c}second page\u{0c}third page").unwrap();

        let loader = TextDocumentLoader;
        let pages = loader.load(file.path()).await.unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], Page::new(0, "first page"));
        assert_eq!(pages[1], Page::new(1, "second page"));
        assert_eq!(pages[2], Page::new(2, "third page"));
    }

    #[tokio::test]
    async fn file_without_form_feeds_is_one_page() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "just one page of text").unwrap();

        let loader = TextDocumentLoader;
        let pages = loader.load(file.path()).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "just one page of text");
    }
}
