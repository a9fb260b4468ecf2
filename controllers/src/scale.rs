use kv2::block::{Block, FieldValue};
use kv2::fields;
use tracing::debug;

use crate::index::ControlIndex;
use crate::naming::{Direction, ScaleKeyName};
use crate::unclaimed::UnclaimedNames;

/// Pair every unclaimed `<base>--neg<A>` with an unclaimed `<base>--pos<A>` and
/// merge each pair into one stereo scale control. Unpaired names stay unclaimed.
pub fn resolve_scale_pairs(
    index: &ControlIndex,
    unclaimed: &mut UnclaimedNames,
    marker: &str,
) -> Vec<Block> {
    let mut blocks = Vec::new();

    for name in unclaimed.snapshot() {
        let Some(neg) = ScaleKeyName::parse(&name).filter(|k| k.direction == Direction::Neg)
        else {
            continue;
        };
        // The pair reuses the id of its neg entry.
        let Some(id) = index.get(&name) else {
            continue;
        };
        let pos = neg.sibling().to_string();
        if !unclaimed.contains(&pos) {
            debug!(control = %name, sibling = %pos, "no unclaimed sibling, left for fallback");
            continue;
        }

        unclaimed.remove(&name);
        unclaimed.remove(&pos);
        blocks.push(scale_pair_block(marker, id, &neg));
    }

    blocks
}

/// The synthesized stereo scale control for a neg key and its pos sibling.
pub fn scale_pair_block(marker: &str, id: &str, neg: &ScaleKeyName) -> Block {
    let pos = neg.sibling();
    Block::new(marker)
        .with_field(fields::ID, FieldValue::scalar("elementid", id))
        .with_field(
            fields::NAME,
            FieldValue::scalar("string", neg.scale_control_name()),
        )
        .with_field(
            fields::RAW_CONTROL_NAMES,
            FieldValue::array("string_array", [neg.to_string(), pos.to_string()]),
        )
        .with_field(fields::STEREO, FieldValue::scalar("bool", "0"))
        .with_field(fields::EYELID, FieldValue::scalar("bool", "0"))
        .with_field(
            fields::WRINKLE_SCALES,
            FieldValue::array("float_array", ["0", "0"]),
        )
}
