use indexmap::IndexSet;

use crate::index::ControlIndex;

/// Control names not yet placed in an output block.
/// Removal keeps the relative order of the names that remain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnclaimedNames {
    names: IndexSet<String>,
}

impl UnclaimedNames {
    pub fn from_index(index: &ControlIndex) -> Self {
        UnclaimedNames {
            names: index.names().map(str::to_string).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns whether the name was still unclaimed. Removing an absent name is a no-op.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.shift_remove(name)
    }

    /// Owned copy of the current names, for passes that remove while they walk.
    pub fn snapshot(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
