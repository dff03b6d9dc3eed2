//! Log output targets.

use std::cell::RefCell;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Destination a formatted log line is written to.
pub trait Target {
    /// Writes one line. A trailing newline is added by the target.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Writes log lines to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTarget;

impl Target for StderrTarget {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        writeln!(handle, "{}", line)
    }
}

/// Appends log lines to a file.
///
/// The parent directory is created at construction time so a fresh
/// deployment does not lose its first lines to a missing `var/logs/`.
#[derive(Debug)]
pub struct FileTarget {
    path: PathBuf,
    file: RefCell<File>,
}

impl FileTarget {
    /// Opens (or creates) the log file in append mode.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: RefCell::new(file),
        })
    }

    /// The file this target appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Target for FileTarget {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.borrow_mut();
        writeln!(file, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let target = FileTarget::open(&path).unwrap();
        target.write_line("first").unwrap();
        target.write_line("second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_file_target_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("var").join("logs").join("app.log");

        let target = FileTarget::open(&path).unwrap();
        target.write_line("entry").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_reopening_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        FileTarget::open(&path).unwrap().write_line("old").unwrap();
        FileTarget::open(&path).unwrap().write_line("new").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "old\nnew\n");
    }
}
