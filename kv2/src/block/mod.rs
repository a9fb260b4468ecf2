use std::ops::Range;

use indexmap::IndexMap;

use crate::fields;

/// How an array field is laid out when written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLayout {
    /// `"name" "kind"` followed by a bracketed item per line.
    Block,
    /// `"name" "kind" ["a", "b"]` on a single line.
    Inline,
}

/// The value half of a field line. `kind` is the declared sub-type
/// (`elementid`, `string`, `bool`, `float_array`, ...) and is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar {
        kind: String,
        text: String,
    },
    Array {
        kind: String,
        items: Vec<String>,
        layout: ArrayLayout,
    },
}

impl FieldValue {
    pub fn scalar(kind: impl Into<String>, text: impl Into<String>) -> Self {
        FieldValue::Scalar {
            kind: kind.into(),
            text: text.into(),
        }
    }

    pub fn array<I, S>(kind: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Array {
            kind: kind.into(),
            items: items.into_iter().map(Into::into).collect(),
            layout: ArrayLayout::Block,
        }
    }

    pub fn inline_array<I, S>(kind: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Array {
            kind: kind.into(),
            items: items.into_iter().map(Into::into).collect(),
            layout: ArrayLayout::Inline,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            FieldValue::Scalar { kind, .. } => kind,
            FieldValue::Array { kind, .. } => kind,
        }
    }
}

/// One `"Type" { ... }` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub type_name: String,
    /// Fields in the order they appeared (or were added).
    pub fields: IndexMap<String, FieldValue>,
    /// Byte span in source, from the type line to the closing brace.
    /// Synthesized blocks carry `0..0`.
    pub span: Range<usize>,
}

impl Block {
    pub fn new(type_name: impl Into<String>) -> Self {
        Block {
            type_name: type_name.into(),
            fields: IndexMap::new(),
            span: 0..0,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text of a scalar field. Arrays of the same name yield `None`.
    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.fields.get(name)? {
            FieldValue::Scalar { text, .. } => Some(text),
            FieldValue::Array { .. } => None,
        }
    }

    /// Items of an array field. Scalars of the same name yield `None`.
    pub fn array(&self, name: &str) -> Option<&[String]> {
        match self.fields.get(name)? {
            FieldValue::Array { items, .. } => Some(items),
            FieldValue::Scalar { .. } => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.scalar(fields::ID)
    }

    pub fn name(&self) -> Option<&str> {
        self.scalar(fields::NAME)
    }

    /// First entry of `rawControlNames`, the member a grouped control is keyed by.
    pub fn representative_name(&self) -> Option<&str> {
        self.array(fields::RAW_CONTROL_NAMES)?
            .first()
            .map(String::as_str)
    }

    /// Replace the `id` value in place, keeping its declared kind and position.
    /// A block without an `id` gets one as its first field.
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        match self.fields.get_mut(fields::ID) {
            Some(FieldValue::Scalar { text, .. }) => *text = id,
            Some(other) => *other = FieldValue::scalar("elementid", id),
            None => {
                self.fields
                    .shift_insert(0, fields::ID.to_string(), FieldValue::scalar("elementid", id));
            }
        }
    }
}
