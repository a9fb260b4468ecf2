use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The destination document a run overwrites.
pub trait TextBuffer {
    fn lines(&self) -> io::Result<Vec<String>>;
    fn clear(&mut self) -> io::Result<()>;
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Whether any line carries something other than whitespace.
    fn has_content(&self) -> io::Result<bool> {
        Ok(self.lines()?.iter().any(|line| !line.trim().is_empty()))
    }
}

/// In-memory destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryBuffer {
    text: String,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        MemoryBuffer::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        MemoryBuffer { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl TextBuffer for MemoryBuffer {
    fn lines(&self) -> io::Result<Vec<String>> {
        Ok(self.text.lines().map(str::to_string).collect())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.text.clear();
        Ok(())
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        self.text.push_str(text);
        Ok(())
    }
}

/// A destination file. A file that does not exist yet reads as empty.
#[derive(Debug, Clone)]
pub struct FileBuffer {
    path: PathBuf,
}

impl FileBuffer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBuffer { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextBuffer for FileBuffer {
    fn lines(&self) -> io::Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn clear(&mut self) -> io::Result<()> {
        fs::write(&self.path, "")
    }

    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }
}
