pub mod cursor;
pub mod error;
mod structural;

pub use cursor::LineCursor;
pub use error::{ParseError, ParseErrorKind};

use crate::block::Block;
use crate::document::Document;

/// Parser entry point.
pub struct Parser<'a> {
    document: &'a Document,
}

impl<'a> Parser<'a> {
    pub fn new(document: &'a Document) -> Self {
        Parser { document }
    }

    /// Parse every block whose type line contains `marker`, in document order.
    /// Lines outside such blocks are skipped.
    pub fn parse_blocks(&self, marker: &str) -> Result<Vec<Block>, ParseError> {
        structural::parse_blocks(self.document, marker)
    }
}
