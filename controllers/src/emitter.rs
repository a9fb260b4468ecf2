use kv2::block::{Block, FieldValue};
use kv2::document::Document;
use kv2::fields;
use kv2::writer::render_field;

use crate::error::GenerateError;
use crate::index::ControlIndex;
use crate::unclaimed::UnclaimedNames;

/// Placeholder value written once per control into both value arrays.
const CONTROL_VALUE_PLACEHOLDER: &str = "0.0 0.0 0.5";
const FOOTER_DEPTH: usize = 2;

/// Accumulates the output document line by line and counts the control blocks written.
#[derive(Debug)]
pub struct Emitter {
    lines: Vec<String>,
    block_count: usize,
}

impl Emitter {
    /// Copy the ID source up to and including its `element_array` line, then open the list.
    pub fn with_header(source: &Document) -> Result<Self, GenerateError> {
        let open = source
            .array_open_index()
            .ok_or(GenerateError::MissingControlArray)?;
        let mut lines: Vec<String> = source.lines[..=open]
            .iter()
            .map(|line| line.text.clone())
            .collect();
        lines.push("\t\t[".to_string());
        Ok(Emitter {
            lines,
            block_count: 0,
        })
    }

    pub fn write_block(&mut self, block: &Block) {
        let rendered = block.to_string();
        self.lines.extend(rendered.lines().map(str::to_string));
        self.block_count += 1;
    }

    pub fn write_blocks<'a>(&mut self, blocks: impl IntoIterator<Item = &'a Block>) {
        for block in blocks {
            self.write_block(block);
        }
    }

    /// One single-name block for each name nobody claimed, in index order.
    /// Returns how many were written.
    pub fn write_fallbacks(
        &mut self,
        index: &ControlIndex,
        unclaimed: &UnclaimedNames,
        marker: &str,
    ) -> usize {
        let before = self.block_count;
        for name in unclaimed.iter() {
            if let Some(id) = index.get(name) {
                self.write_block(&fallback_block(marker, id, name));
            }
        }
        self.block_count - before
    }

    /// Close the list, write the per-control value arrays and the operator's closing fields.
    pub fn finish(mut self) -> (Vec<String>, usize) {
        self.lines.push("\t\t]".to_string());

        let placeholders = vec![CONTROL_VALUE_PLACEHOLDER; self.block_count];
        for name in ["controlValues", "controlValuesLagged"] {
            let value = FieldValue::inline_array("vector3_array", placeholders.iter().copied());
            self.push_field(name, &value);
        }
        self.push_field("usesLaggedValues", &FieldValue::scalar("bool", "0"));
        let no_elements = FieldValue::inline_array("element_array", Vec::<String>::new());
        self.push_field("dominators", &no_elements);
        self.push_field("targets", &no_elements);

        self.lines.push("\t}".to_string());
        self.lines.push("}".to_string());
        (self.lines, self.block_count)
    }

    fn push_field(&mut self, name: &str, value: &FieldValue) {
        let rendered = render_field(FOOTER_DEPTH, name, value);
        self.lines.extend(rendered.lines().map(str::to_string));
    }
}

/// Minimal control for a single name: `rawControlNames` and `wrinkleScales` are written inline.
pub fn fallback_block(marker: &str, id: &str, name: &str) -> Block {
    Block::new(marker)
        .with_field(fields::ID, FieldValue::scalar("elementid", id))
        .with_field(fields::NAME, FieldValue::scalar("string", name))
        .with_field(
            fields::RAW_CONTROL_NAMES,
            FieldValue::inline_array("string_array", [name]),
        )
        .with_field(fields::STEREO, FieldValue::scalar("bool", "0"))
        .with_field(fields::EYELID, FieldValue::scalar("bool", "0"))
        .with_field(
            fields::WRINKLE_SCALES,
            FieldValue::inline_array("float_array", ["0.0"]),
        )
}
