use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Walks `dir` depth-first and keeps regular files whose name contains
/// `fixed_title`, ignoring case. Results are sorted by file name, then by
/// full path, so the first entry is stable across platforms.
pub fn find_matching_files<P: AsRef<Path>>(dir: P, fixed_title: &str) -> Result<Vec<PathBuf>, walkdir::Error> {
    let needle = fixed_title.to_lowercase();
    let mut files = Vec::new();

    for entry in WalkDir::new(dir.as_ref()) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matched = entry.file_name().to_string_lossy().to_lowercase().contains(&needle);
        if matched {
            debug!(path = %entry.path().display(), "matched file");
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
    Ok(files)
}

/// File name component as a string, lossily converted.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
