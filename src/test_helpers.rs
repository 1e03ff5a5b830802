//! Test utilities for creating temporary log files and rotating them.

#[cfg(test)]
use std::fs::{File, OpenOptions};
#[cfg(test)]
use std::io::Write;
#[cfg(test)]
use std::path::{Path, PathBuf};

#[cfg(test)]
pub struct TempLogFile {
    pub path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

#[cfg(test)]
impl TempLogFile {
    /// Create a new empty log file in its own temporary directory
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("test.log");

        File::create(&path)?;

        Ok(Self {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a log file holding exactly `content`
    pub fn with_content(content: &str) -> std::io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append_raw(content)?;
        Ok(temp_file)
    }

    /// Append bytes verbatim
    pub fn append_raw(&self, content: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Append one newline-terminated line in a single write
    pub fn append_line(&self, line: &str) -> std::io::Result<()> {
        self.append_raw(&format!("{}\n", line))
    }

    /// Rename the file to `<name>.1` and start a new empty one in its place
    pub fn rotate(&self) -> std::io::Result<()> {
        std::fs::rename(&self.path, self.rotated_path())?;
        File::create(&self.path)?;
        Ok(())
    }

    /// Where the rotated sibling lives
    pub fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".1");
        PathBuf::from(name)
    }

    /// A path inside the same temporary directory
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.path.with_file_name(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_log_file_creation() {
        let temp_file = TempLogFile::new().unwrap();
        assert!(temp_file.path().exists());
        assert_eq!(std::fs::read_to_string(temp_file.path()).unwrap(), "");
    }

    #[test]
    fn test_append_line_and_raw() {
        let temp_file = TempLogFile::with_content("a\n").unwrap();
        temp_file.append_line("b").unwrap();
        temp_file.append_raw("c").unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "a\nb\nc");
    }

    #[test]
    fn test_rotate() {
        let temp_file = TempLogFile::with_content("old\n").unwrap();
        temp_file.rotate().unwrap();

        assert_eq!(std::fs::read_to_string(temp_file.path()).unwrap(), "");
        assert_eq!(
            std::fs::read_to_string(temp_file.rotated_path()).unwrap(),
            "old\n"
        );
        assert!(temp_file.rotated_path().to_string_lossy().ends_with("test.log.1"));
    }
}
