//! Filesystem helpers.

use std::path::Path;

use crate::error::MediaResult;

/// Create a directory and its parents if missing.
pub fn ensure_dir(path: impl AsRef<Path>) -> MediaResult<()> {
    std::fs::create_dir_all(path.as_ref())?;
    Ok(())
}

/// True if the path exists and has non-zero length.
pub fn is_non_empty_file(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path.as_ref())
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_non_empty_file_checks() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.mp4");
        std::fs::File::create(&empty).unwrap();
        assert!(!is_non_empty_file(&empty));

        let full = dir.path().join("full.mp4");
        let mut f = std::fs::File::create(&full).unwrap();
        f.write_all(b"data").unwrap();
        assert!(is_non_empty_file(&full));

        assert!(!is_non_empty_file(dir.path().join("missing.mp4")));
        assert!(!is_non_empty_file(dir.path()));
    }

    #[test]
    fn test_ensure_dir_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
