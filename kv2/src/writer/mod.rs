use std::fmt;

use crate::block::{ArrayLayout, Block, FieldValue};

/// Tab depth of a control block's type line and braces inside the control list.
pub const BLOCK_DEPTH: usize = 3;
/// Tab depth of fields inside a control block.
pub const FIELD_DEPTH: usize = 4;

/// Render one field at the given tab depth. Every line, including the last, ends in `\n`.
pub fn render_field(depth: usize, name: &str, value: &FieldValue) -> String {
    let indent = "\t".repeat(depth);
    match value {
        FieldValue::Scalar { kind, text } => {
            format!("{}\"{}\" \"{}\" \"{}\"\n", indent, name, kind, text)
        }
        FieldValue::Array {
            kind,
            items,
            layout: ArrayLayout::Inline,
        } => {
            let body = if items.is_empty() {
                " ".to_string()
            } else {
                items
                    .iter()
                    .map(|item| format!("\"{}\"", item))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("{}\"{}\" \"{}\" [{}]\n", indent, name, kind, body)
        }
        FieldValue::Array {
            kind,
            items,
            layout: ArrayLayout::Block,
        } => {
            let mut out = format!("{}\"{}\" \"{}\"\n{}[\n", indent, name, kind, indent);
            let item_indent = "\t".repeat(depth + 1);
            let body = items
                .iter()
                .map(|item| format!("{}\"{}\"", item_indent, item))
                .collect::<Vec<_>>()
                .join(",\n");
            if !body.is_empty() {
                out.push_str(&body);
                out.push('\n');
            }
            out.push_str(&indent);
            out.push_str("]\n");
            out
        }
    }
}

/// Writes a block as an element of the control list, closing brace followed by `,`.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "\t".repeat(BLOCK_DEPTH);
        writeln!(f, "{}\"{}\"", indent, self.type_name)?;
        writeln!(f, "{}{{", indent)?;
        for (name, value) in &self.fields {
            write!(f, "{}", render_field(FIELD_DEPTH, name, value))?;
        }
        writeln!(f, "{}}},", indent)
    }
}
