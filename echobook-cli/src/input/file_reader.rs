//! File reading and writing utilities

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Text file access with path-aware errors
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text, dropping a leading byte-order mark
    pub fn read_text(path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(match content.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => content,
        })
    }

    /// Read a list file: one entry per line, blank lines and `#` comments skipped
    pub fn read_list(path: &Path) -> Result<Vec<String>> {
        Ok(Self::read_text(path)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect())
    }

    /// Write text, creating parent directories
    pub fn write_text(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "Hello, world!\nThis is a test.").unwrap();

        let result = FileReader::read_text(&file_path).unwrap();
        assert_eq!(result, "Hello, world!\nThis is a test.");
    }

    #[test]
    fn test_read_text_strips_bom() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bom.txt");
        fs::write(&file_path, "\u{feff}FIRST BOOK").unwrap();
        assert_eq!(FileReader::read_text(&file_path).unwrap(), "FIRST BOOK");
    }

    #[test]
    fn test_read_text_nonexistent_file() {
        let err = FileReader::read_text(Path::new("/nonexistent/file.txt")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_read_list() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("titles.txt");
        fs::write(&file_path, "# subbooks\nFIRST BOOK\n\n  SECOND BOOK  \n").unwrap();
        assert_eq!(
            FileReader::read_list(&file_path).unwrap(),
            vec!["FIRST BOOK", "SECOND BOOK"]
        );
    }

    #[test]
    fn test_write_text_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a/b/out.txt");
        FileReader::write_text(&file_path, "x").unwrap();
        assert_eq!(fs::read_to_string(file_path).unwrap(), "x");
    }
}
