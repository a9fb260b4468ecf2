use kv2::block::Block;
use kv2::fields;
use tracing::debug;

use crate::error::GenerateWarning;
use crate::index::ControlIndex;
use crate::unclaimed::UnclaimedNames;

/// Blocks produced from combination records, plus records that could not be used.
#[derive(Debug, Default)]
pub struct GroupedOutcome {
    pub blocks: Vec<Block>,
    pub warnings: Vec<GenerateWarning>,
}

/// Match each record's representative name against the index, in record order.
/// A matched record claims all of its member names and is re-emitted with the
/// index's id. Records for controls this model does not have, or whose
/// representative an earlier record already claimed, are skipped.
pub fn resolve_grouped(
    index: &ControlIndex,
    unclaimed: &mut UnclaimedNames,
    records: &[Block],
    file_id: usize,
) -> GroupedOutcome {
    let mut outcome = GroupedOutcome::default();

    for record in records {
        let Some(members) = record
            .array(fields::RAW_CONTROL_NAMES)
            .filter(|members| !members.is_empty())
        else {
            outcome
                .warnings
                .push(GenerateWarning::RecordWithoutControlNames {
                    name: record.name().map(str::to_string),
                    span: record.span.clone(),
                    file_id,
                });
            continue;
        };

        let representative = &members[0];
        let Some(id) = index.get(representative) else {
            debug!(control = %representative, "combination record not in this model, skipped");
            continue;
        };
        if !unclaimed.contains(representative) {
            debug!(control = %representative, "combination record already claimed, skipped");
            continue;
        }

        for member in members {
            unclaimed.remove(member);
        }

        let mut block = record.clone();
        block.set_id(id);
        debug!(
            control = %representative,
            members = members.len(),
            "grouped control resolved"
        );
        outcome.blocks.push(block);
    }

    outcome
}
