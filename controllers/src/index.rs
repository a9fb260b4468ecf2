use indexmap::IndexMap;
use kv2::document::Document;
use kv2::fields;
use kv2::parser::Parser;
use tracing::debug;

use crate::error::GenerateError;

/// Control display name to element id, in the order the controls appear in the ID source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlIndex {
    entries: IndexMap<String, String>,
}

impl ControlIndex {
    /// Read every `marker` block of `document` and record its `name -> id`.
    /// A repeated name keeps its first position and takes the later id.
    pub fn build(document: &Document, marker: &str) -> Result<Self, GenerateError> {
        let blocks = Parser::new(document).parse_blocks(marker)?;
        let mut entries = IndexMap::with_capacity(blocks.len());

        for block in &blocks {
            let malformed = |field| GenerateError::MalformedControlBlock {
                field,
                span: block.span.clone(),
                file_id: document.file_id,
            };
            let id = block.id().ok_or_else(|| malformed(fields::ID))?;
            let name = block.name().ok_or_else(|| malformed(fields::NAME))?;
            if entries.insert(name.to_string(), id.to_string()).is_some() {
                debug!(control = name, "control name repeated in ID source");
            }
        }

        Ok(ControlIndex { entries })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, id)| (name.as_str(), id.as_str()))
    }
}

impl<N: Into<String>, I: Into<String>> FromIterator<(N, I)> for ControlIndex {
    fn from_iter<T: IntoIterator<Item = (N, I)>>(iter: T) -> Self {
        ControlIndex {
            entries: iter
                .into_iter()
                .map(|(name, id)| (name.into(), id.into()))
                .collect(),
        }
    }
}
