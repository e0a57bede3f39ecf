//! Directory listings and text previews for the file and label-data browsers.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use crate::source::{is_fits_path, is_supported_image};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// File size in bytes; 0 for directories or when unreadable.
    pub size: u64,
}

/// Lists `dir`, directories first, then by name.
///
/// An unreadable directory yields an empty list rather than an error, so a
/// UI can render it every frame without special cases.
pub fn list_dir(dir: &Path) -> Vec<DirEntry> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut entries: Vec<DirEntry> = read
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            let is_dir = path.is_dir();
            let size = if is_dir {
                0
            } else {
                entry.metadata().map(|m| m.len()).unwrap_or(0)
            };
            DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_dir,
                size,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Per-directory listing cache for tree views that redraw every frame.
#[derive(Debug, Default)]
pub struct DirCache {
    entries: HashMap<PathBuf, Vec<DirEntry>>,
}

impl DirCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached listing of `dir`, read on first use. Failures are cached too.
    pub fn entries(&mut self, dir: &Path) -> &[DirEntry] {
        self.entries
            .entry(dir.to_path_buf())
            .or_insert_with(|| list_dir(dir))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// `.txt` label files anywhere below `root`, sorted by path.
pub fn find_label_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();
    files.sort();
    files
}

/// Absolute form of a configured root: as given if it exists, else joined
/// onto `cwd` (the UI reports the missing directory).
pub fn resolve_root(root: &Path, cwd: &Path) -> PathBuf {
    if root.is_absolute() {
        return root.to_path_buf();
    }
    if root.exists() {
        fs::canonicalize(root).unwrap_or_else(|_| cwd.join(root))
    } else {
        cwd.join(root)
    }
}

/// Human-readable file size: bytes, KB or MB with two decimals.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// First lines of a text file, cut after `max_lines` lines or `max_bytes`
/// bytes with a trailing `...` line.
pub fn read_text_preview(path: &Path, max_lines: usize, max_bytes: usize) -> std::io::Result<String> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut out = String::new();
    let mut lines = 0usize;
    let mut bytes = 0usize;

    for line in reader.lines() {
        let line = line?;
        bytes += line.len() + 1;
        lines += 1;
        out.push_str(&line);
        out.push('\n');
        if lines >= max_lines || bytes >= max_bytes {
            out.push_str("...\n");
            break;
        }
    }
    Ok(out)
}
