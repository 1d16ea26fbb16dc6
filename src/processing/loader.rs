//! Staging area management and PDF page extraction.
//!
//! Uploads are written to a scratch directory that is wiped before every batch, then read back
//! one file at a time. Parsing runs on the blocking pool because `pdf-extract` is synchronous and
//! can take seconds on large documents.

use super::types::{ChunkSource, LoadError, PageText, UploadedFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Turns raw document bytes into per-page text.
pub trait PageExtractor: Send + Sync {
    /// Extract the text of every page, in page order.
    fn extract_pages(&self, filename: &str, bytes: &[u8]) -> Result<Vec<String>, LoadError>;
}

/// [`PageExtractor`] backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfPageExtractor;

impl PageExtractor for PdfPageExtractor {
    fn extract_pages(&self, filename: &str, bytes: &[u8]) -> Result<Vec<String>, LoadError> {
        pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|error| LoadError::Pdf {
            filename: filename.to_string(),
            message: error.to_string(),
        })
    }
}

/// Whether `filename` carries a `.pdf` suffix (case-insensitive).
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Strip any directory components from a client-supplied filename.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// Split uploads into PDF files and the names of rejected files.
///
/// Accepted files have their names sanitized; rejected names are reported as received.
pub fn partition_uploads(files: Vec<UploadedFile>) -> (Vec<UploadedFile>, Vec<String>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for file in files {
        match sanitize_filename(&file.filename) {
            Some(name) if is_pdf_filename(&name) => valid.push(UploadedFile {
                filename: name,
                bytes: file.bytes,
            }),
            _ => invalid.push(file.filename),
        }
    }

    (valid, invalid)
}

/// Remove everything under `dir` and recreate it empty.
pub async fn clear_staging_dir(dir: &Path) -> Result<(), LoadError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(source) => return Err(io_error(dir, source)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| io_error(dir, source))?;
    tracing::debug!(dir = %dir.display(), "Staging directory cleared");
    Ok(())
}

/// Write an accepted upload into the staging directory.
pub async fn stage_file(dir: &Path, file: &UploadedFile) -> Result<PathBuf, LoadError> {
    let path = dir.join(&file.filename);
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|source| io_error(&path, source))?;
    tracing::debug!(path = %path.display(), bytes = file.bytes.len(), "Staged upload");
    Ok(path)
}

/// List staged PDF files in filename order.
pub fn staged_pdfs(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| LoadError::Io {
            path: dir.display().to_string(),
            source: error.into(),
        })?;
        if entry.file_type().is_file() && is_pdf_filename(&entry.file_name().to_string_lossy()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Read a staged file and extract its pages on the blocking pool.
pub async fn load_pdf(
    extractor: Arc<dyn PageExtractor>,
    path: PathBuf,
) -> Result<Vec<PageText>, LoadError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let task_filename = filename.clone();

    let joined = tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path).map_err(|source| io_error(&path, source))?;
        extractor.extract_pages(&task_filename, &bytes)
    })
    .await;

    let pages = match joined {
        Ok(result) => result?,
        Err(error) => {
            return Err(LoadError::Pdf {
                filename,
                message: format!("parser task failed: {error}"),
            });
        }
    };

    tracing::debug!(filename = %filename, pages = pages.len(), "Extracted PDF pages");
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(position, text)| PageText {
            text,
            source: ChunkSource {
                filename: filename.clone(),
                page_number: position + 1,
            },
        })
        .collect())
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.display().to_string(),
        source,
    }
}
