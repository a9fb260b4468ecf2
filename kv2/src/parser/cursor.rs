use crate::document::Line;

/// Forward-only cursor over document lines with one line of lookahead.
/// Running off the end is reported as `None`, never as an error.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    lines: &'a [Line],
    index: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [Line]) -> Self {
        LineCursor { lines, index: 0 }
    }

    pub fn peek(&self) -> Option<&'a Line> {
        self.lines.get(self.index)
    }

    /// Index of the line the next call to `next` will return.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.lines.len()
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = &'a Line;

    fn next(&mut self) -> Option<&'a Line> {
        let line = self.lines.get(self.index)?;
        self.index += 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn peek_does_not_advance() {
        let doc = Document::from_lines(["a", "b"], 0);
        let mut cursor = LineCursor::new(&doc.lines);
        assert_eq!(cursor.peek().map(|l| l.text.as_str()), Some("a"));
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.next().map(|l| l.text.as_str()), Some("a"));
        assert_eq!(cursor.peek().map(|l| l.text.as_str()), Some("b"));
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn exhaustion_is_none() {
        let doc = Document::from_lines(["only"], 0);
        let mut cursor = LineCursor::new(&doc.lines);
        cursor.next();
        assert!(cursor.is_at_end());
        assert!(cursor.next().is_none());
        assert!(cursor.peek().is_none());
        assert_eq!(cursor.index(), 1);
    }
}
