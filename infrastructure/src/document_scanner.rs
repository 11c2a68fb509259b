use docx_rs::{read_docx, DocumentChild};
use memmap2::Mmap;
use rayon::prelude::*;
use shared::types::Result;
use shared::utils::is_supported_document;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DocumentChunk {
    pub path: String,
    pub text: String,
    pub start_offset: usize,
}

#[derive(Debug, Clone)]
pub struct DocumentScan {
    pub path: String,
    pub hash: String,
    pub chunks: Vec<DocumentChunk>,
}

/// Walks a document directory and turns each supported file into hashed,
/// deduplicated text chunks ready for embedding.
pub struct DocumentScanner {
    root_path: PathBuf,
    ignored_dirs: HashSet<String>,
    max_file_bytes: u64,
}

impl DocumentScanner {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ignored_dirs: [".git", ".cache", ".idea", ".vscode", "node_modules", "target"]
                .into_iter()
                .map(String::from)
                .collect(),
            // Cap per-file work to keep indexing responsive.
            max_file_bytes: 8 * 1024 * 1024,
        }
    }

    pub fn scan_documents(&self) -> Result<Vec<DocumentScan>> {
        let files = self.collect_files()?;
        self.scan_paths(&files)
    }

    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.collect_files_recursive(&self.root_path, &mut files)?;
        files.sort();
        Ok(files)
    }

    pub fn scan_paths(&self, paths: &[PathBuf]) -> Result<Vec<DocumentScan>> {
        let results: Vec<Result<DocumentScan>> = paths
            .par_iter()
            .map(|path| self.load_and_chunk(path))
            .collect();
        let mut scans = Vec::with_capacity(paths.len());
        for res in results {
            scans.push(res?);
        }
        Ok(scans)
    }

    fn collect_files_recursive(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if self.ignored_dirs.contains(name) {
                        continue;
                    }
                }
                self.collect_files_recursive(&path, files)?;
            } else if is_supported_document(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn load_and_chunk(&self, path: &Path) -> Result<DocumentScan> {
        let path_str = path.to_string_lossy().to_string();
        if let Ok(meta) = path.metadata() {
            if meta.len() > self.max_file_bytes {
                return Ok(DocumentScan {
                    path: path_str,
                    hash: String::new(),
                    chunks: Vec::new(),
                });
            }
        }

        let content = self.extract_text(path)?;
        if content.trim().is_empty() {
            return Ok(DocumentScan {
                path: path_str,
                hash: String::new(),
                chunks: Vec::new(),
            });
        }

        let hash = format!("{:x}", md5::compute(content.as_bytes()));
        let chunks = chunk_text(&content, &path_str);
        Ok(DocumentScan {
            path: path_str,
            hash,
            chunks,
        })
    }

    fn extract_text(&self, path: &Path) -> Result<String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(pdf_extract::extract_text(path)?),
            "docx" => extract_docx_text(path),
            _ => {
                let file = File::open(path)?;
                let mmap = unsafe { Mmap::map(&file)? };
                // Lossy conversion ensures non-UTF8 bytes don't abort a scan.
                Ok(String::from_utf8_lossy(&mmap).into_owned())
            }
        }
    }
}

fn extract_docx_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let docx = read_docx(&bytes)?;
    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            text.push_str(&p.raw_text());
            text.push('\n');
        }
    }
    Ok(text)
}

const MAX_CHUNK_SIZE: usize = 2000;
const MIN_CHUNK_SIZE: usize = 400;
const FIXED_CHUNK_SIZE: usize = 1000;
const FIXED_CHUNK_OVERLAP: usize = 200;

/// Paragraph-based chunking with a fixed-size overlapping fallback for text
/// without blank-line structure. Duplicate chunks are dropped.
fn chunk_text(text: &str, path: &str) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut seen = HashSet::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut cursor = 0;

    let mut flush = |current: &mut String,
                     start: &mut Option<usize>,
                     seen: &mut HashSet<String>,
                     out: &mut Vec<DocumentChunk>| {
        if current.is_empty() {
            return;
        }
        let start_offset = start.take().unwrap_or(0);
        let hash = format!("{:x}", md5::compute(current.as_bytes()));
        if seen.insert(hash) {
            out.push(DocumentChunk {
                path: path.to_string(),
                text: current.clone(),
                start_offset,
            });
        }
        current.clear();
    };

    for paragraph in text.split("\n\n") {
        if !current.is_empty() && current.len() + paragraph.len() > MAX_CHUNK_SIZE {
            flush(&mut current, &mut start, &mut seen, &mut chunks);
        }
        if current.is_empty() {
            start = Some(cursor);
        } else {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
        cursor += paragraph.len() + 2;

        if current.len() >= MIN_CHUNK_SIZE {
            flush(&mut current, &mut start, &mut seen, &mut chunks);
        }
    }
    flush(&mut current, &mut start, &mut seen, &mut chunks);

    if chunks.is_empty() {
        chunk_fixed_size(text, path)
    } else {
        chunks
    }
}

fn chunk_fixed_size(text: &str, path: &str) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    let mut seen = HashSet::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + FIXED_CHUNK_SIZE).min(text.len());
        while end < text.len() && !text.is_char_boundary(end) {
            end += 1;
        }
        let slice = &text[start..end];
        let hash = format!("{:x}", md5::compute(slice.as_bytes()));
        if seen.insert(hash) {
            chunks.push(DocumentChunk {
                path: path.to_string(),
                text: slice.to_string(),
                start_offset: start,
            });
        }
        if end == text.len() {
            break;
        }
        let mut next = end.saturating_sub(FIXED_CHUNK_OVERLAP);
        while next > 0 && !text.is_char_boundary(next) {
            next -= 1;
        }
        start = next.max(start + 1);
    }
    chunks
}
