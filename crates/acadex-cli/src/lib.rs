//! Helpers for the Acadex CLI: tracing init and file-candidate collection.

use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use acadex_upload::{FileCandidate, FilePayload};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// MIME type from the file extension; octet-stream when unknown.
pub fn guess_content_type(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or("").to_lowercase();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Build a disk-backed candidate from a single picked file.
pub fn candidate_from_path(path: &Path, relative_path: Option<String>) -> Result<FileCandidate> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .unwrap_or_else(|| "file".to_string());

    let last_modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let payload = FilePayload::from_path(
        name.clone(),
        path,
        metadata.len(),
        guess_content_type(&name),
        last_modified,
    );

    Ok(match relative_path {
        Some(rel) => FileCandidate::from_folder(payload, rel),
        None => FileCandidate::file(payload),
    })
}

/// Collect every file under `dir` (recursively, in path order) as folder
/// candidates whose relative path is rooted at the picked directory.
pub fn collect_dir_candidates(dir: &Path) -> Result<Vec<FileCandidate>> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .into_owned();
        candidates.push(candidate_from_path(entry.path(), Some(relative))?);
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn guess_content_type_known_extensions() {
        assert_eq!(guess_content_type("notes.PDF"), "application/pdf");
        assert_eq!(guess_content_type("photo.jpeg"), "image/jpeg");
        assert_eq!(guess_content_type("data.bin"), "application/octet-stream");
        assert_eq!(guess_content_type("no_extension"), "application/octet-stream");
    }

    #[test]
    fn candidate_from_path_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week1.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello")
            .unwrap();

        let candidate = candidate_from_path(&path, None).unwrap();
        assert_eq!(candidate.payload.name, "week1.pdf");
        assert_eq!(candidate.payload.size(), 5);
        assert_eq!(candidate.payload.content_type, "application/pdf");
        assert!(candidate.relative_path.is_none());
    }

    #[test]
    fn candidate_from_path_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(candidate_from_path(dir.path(), None).is_err());
    }

    #[test]
    fn collect_dir_candidates_walks_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("week1")).unwrap();
        std::fs::write(dir.path().join("week1/a.pdf"), b"a").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"bb").unwrap();

        let candidates = collect_dir_candidates(dir.path()).unwrap();
        assert_eq!(candidates.len(), 2);
        let relatives: Vec<_> = candidates
            .iter()
            .map(|c| c.relative_path.clone().unwrap())
            .collect();
        assert!(relatives.contains(&"week1/a.pdf".to_string()));
        assert!(relatives.contains(&"b.txt".to_string()));
    }
}
