use kv2::SIGNATURE;
use kv2::document::Document;
use kv2::parser::Parser;
use tracing::{info, warn};

use crate::buffer::TextBuffer;
use crate::config::GeneratorConfig;
use crate::emitter::Emitter;
use crate::error::{GenerateError, GenerateWarning};
use crate::grouped::resolve_grouped;
use crate::index::ControlIndex;
use crate::scale::resolve_scale_pairs;
use crate::unclaimed::UnclaimedNames;

/// How many blocks each stage contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    pub grouped: usize,
    pub scale_pairs: usize,
    pub fallbacks: usize,
}

/// The result of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// Output document lines, without terminators.
    pub lines: Vec<String>,
    /// Control blocks written; equals the entry count of both value arrays.
    pub block_count: usize,
    pub stages: StageCounts,
    pub soft_limit: usize,
    pub warnings: Vec<GenerateWarning>,
}

impl Generation {
    /// The output document, one `\n` after every line.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn summary(&self) -> String {
        format!(
            "Generated {} controllers ({} supported)",
            self.block_count, self.soft_limit
        )
    }
}

/// Build the controller document for `id_source`, folding in the grouped
/// controls of `combinations` when one is given.
pub fn generate(
    id_source: Option<&Document>,
    combinations: Option<&Document>,
    config: &GeneratorConfig,
) -> Result<Generation, GenerateError> {
    let source = id_source.ok_or(GenerateError::MissingIdSource)?;

    let index = ControlIndex::build(source, &config.marker)?;
    let mut emitter = Emitter::with_header(source)?;
    let mut unclaimed = UnclaimedNames::from_index(&index);
    let mut warnings = Vec::new();
    info!(controls = index.len(), "control index built");

    let grouped = match combinations {
        Some(document) => {
            let records = Parser::new(document).parse_blocks(&config.marker)?;
            let outcome = resolve_grouped(&index, &mut unclaimed, &records, document.file_id);
            warnings.extend(outcome.warnings);
            outcome.blocks
        }
        None => Vec::new(),
    };
    let pairs = resolve_scale_pairs(&index, &mut unclaimed, &config.marker);

    emitter.write_blocks(&grouped);
    emitter.write_blocks(&pairs);
    let fallbacks = emitter.write_fallbacks(&index, &unclaimed, &config.marker);
    let (lines, block_count) = emitter.finish();

    let stages = StageCounts {
        grouped: grouped.len(),
        scale_pairs: pairs.len(),
        fallbacks,
    };
    info!(
        grouped = stages.grouped,
        scale_pairs = stages.scale_pairs,
        fallbacks = stages.fallbacks,
        total = block_count,
        "controllers generated"
    );

    if block_count > config.soft_limit {
        warn!(
            count = block_count,
            limit = config.soft_limit,
            "controller count exceeds soft limit"
        );
        warnings.push(GenerateWarning::SoftLimitExceeded {
            count: block_count,
            limit: config.soft_limit,
        });
    }

    Ok(Generation {
        lines,
        block_count,
        stages,
        soft_limit: config.soft_limit,
        warnings,
    })
}

/// Refuse destinations that hold something other than a controller document.
/// An empty destination is always accepted.
pub fn check_destination<B: TextBuffer + ?Sized>(destination: &B) -> Result<(), GenerateError> {
    if !destination.has_content()? {
        return Ok(());
    }
    let lines = destination.lines()?;
    match lines.first() {
        Some(first) if first == SIGNATURE => Ok(()),
        first => Err(GenerateError::NotAControllerDocument {
            first_line: first.cloned().unwrap_or_default(),
        }),
    }
}

/// Generate, then replace the destination's contents with the result.
/// The destination is only touched once generation has succeeded.
pub fn generate_into<B: TextBuffer + ?Sized>(
    destination: &mut B,
    id_source: Option<&Document>,
    combinations: Option<&Document>,
    config: &GeneratorConfig,
) -> Result<Generation, GenerateError> {
    check_destination(destination)?;
    let generation = generate(id_source, combinations, config)?;
    destination.clear()?;
    destination.write(&generation.text())?;
    Ok(generation)
}
