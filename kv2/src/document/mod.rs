use std::fmt;
use std::ops::Range;

use crate::{ELEMENT_ARRAY, SIGNATURE};

/// A single source line without its terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    /// Byte offset of the first character in the source file.
    pub offset: usize,
}

impl Line {
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.text.len()
    }
}

/// A line-oriented keyvalues2 document.
/// Line order is significant and header lines are passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub lines: Vec<Line>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub file_id: usize,
}

impl Document {
    pub fn empty(file_id: usize) -> Self {
        Document {
            lines: Vec::new(),
            file_id,
        }
    }

    /// Split source text into lines, accepting both `\n` and `\r\n` endings.
    pub fn from_source(source: &str, file_id: usize) -> Self {
        let mut lines = Vec::new();
        let mut offset = 0;
        for raw in source.split_inclusive('\n') {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            lines.push(Line {
                text: text.to_string(),
                offset,
            });
            offset += raw.len();
        }
        Document { lines, file_id }
    }

    /// Build a document from already split lines, as handed over by a text buffer.
    pub fn from_lines<I, S>(lines: I, file_id: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut offset = 0;
        let lines = lines
            .into_iter()
            .map(|text| {
                let text = text.into();
                let line = Line { offset, text };
                offset += line.text.len() + 1;
                line
            })
            .collect();
        Document { lines, file_id }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.text.as_str())
    }

    /// Whether the first line is exactly the keyvalues2 model signature.
    pub fn has_signature(&self) -> bool {
        self.lines.first().is_some_and(|line| line.text == SIGNATURE)
    }

    /// Index of the first line that introduces an `element_array` section.
    pub fn array_open_index(&self) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.text.contains(ELEMENT_ARRAY))
    }

    /// Byte offset one past the last line.
    pub fn end_offset(&self) -> usize {
        self.lines.last().map(|line| line.span().end).unwrap_or(0)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text)?;
        }
        Ok(())
    }
}
