use indexmap::IndexMap;

use crate::block::{ArrayLayout, Block, FieldValue};
use crate::document::{Document, Line};
use crate::parser::cursor::LineCursor;
use crate::parser::error::{ParseError, ParseErrorKind};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scan `document` top to bottom and parse each block whose type line contains `marker`.
pub fn parse_blocks(document: &Document, marker: &str) -> Result<Vec<Block>, ParseError> {
    let mut cursor = LineCursor::new(&document.lines);
    let mut blocks = Vec::new();

    while let Some(line) = cursor.next() {
        if line.text.contains(marker) {
            blocks.push(parse_block(document, &mut cursor, line, marker)?);
        }
    }

    Ok(blocks)
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

fn parse_block(
    document: &Document,
    cursor: &mut LineCursor<'_>,
    type_line: &Line,
    type_name: &str,
) -> Result<Block, ParseError> {
    // The line after the type tag holds the opening brace.
    if cursor.next().is_none() {
        return Err(unterminated(document, type_line, "block"));
    }

    let mut fields = IndexMap::new();

    loop {
        let Some(line) = cursor.next() else {
            return Err(unterminated(document, type_line, "block"));
        };
        let trimmed = line.text.trim();

        if is_closer(trimmed, '}') {
            return Ok(Block {
                type_name: type_name.to_string(),
                fields,
                span: type_line.offset..line.span().end,
            });
        }

        let tokens = split_tokens(trimmed);
        match tokens.as_slice() {
            // Three tokens are always a scalar, even `"name" "kind" ["x"]`.
            [name, kind, value] => {
                fields.insert(name.clone(), FieldValue::scalar(kind.clone(), value.clone()));
            }
            [name, kind, open, ..] if open.starts_with('[') => {
                let Some(items) = inline_array_items(trimmed) else {
                    return Err(ParseError::error(
                        ParseErrorKind::MalformedField,
                        "inline array is not closed on its line",
                        line.span(),
                        document.file_id,
                    )
                    .with_note(format!("inside `{}` block", type_name)));
                };
                fields.insert(
                    name.clone(),
                    FieldValue::Array {
                        kind: kind.clone(),
                        items,
                        layout: ArrayLayout::Inline,
                    },
                );
            }
            [name, kind] => {
                let items = parse_array_items(document, cursor, line)?;
                fields.insert(
                    name.clone(),
                    FieldValue::Array {
                        kind: kind.clone(),
                        items,
                        layout: ArrayLayout::Block,
                    },
                );
            }
            _ => {
                return Err(ParseError::error(
                    ParseErrorKind::MalformedField,
                    format!(
                        "expected `\"name\" \"kind\" \"value\"` or `\"name\" \"kind\"`, found {} token(s)",
                        tokens.len()
                    ),
                    line.span(),
                    document.file_id,
                )
                .with_note(format!("inside `{}` block", type_name)));
            }
        }
    }
}

/// Consume the `[` line after an array header, then one item per line until `]`.
fn parse_array_items(
    document: &Document,
    cursor: &mut LineCursor<'_>,
    header: &Line,
) -> Result<Vec<String>, ParseError> {
    if cursor.next().is_none() {
        return Err(unterminated(document, header, "array"));
    }

    let mut items = Vec::new();
    loop {
        let Some(line) = cursor.next() else {
            return Err(unterminated(document, header, "array"));
        };
        let trimmed = line.text.trim();
        if is_closer(trimmed, ']') {
            return Ok(items);
        }
        items.push(strip_item(trimmed));
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `}` / `]`, optionally followed by the list separator that ends every element but the last.
fn is_closer(trimmed: &str, closer: char) -> bool {
    trimmed
        .strip_prefix(closer)
        .is_some_and(|rest| rest.is_empty() || rest == ",")
}

/// Quote-stripped, whitespace-separated tokens of a field line.
fn split_tokens(trimmed: &str) -> Vec<String> {
    trimmed
        .replace('"', "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Items of a one-line `"name" "kind" [ "a", "b" ]` field, or `None` when the `]` is missing.
fn inline_array_items(trimmed: &str) -> Option<Vec<String>> {
    // Skip the two quoted header tokens.
    let (_, rest) = trimmed.match_indices('"').nth(3).map(|(i, _)| trimmed.split_at(i + 1))?;
    let rest = rest.trim();
    let rest = rest.strip_suffix(',').unwrap_or(rest);
    let inner = rest.strip_prefix('[')?.strip_suffix(']')?;

    if inner.contains('"') {
        // Quoted items may hold spaces, as in vector values.
        return Some(inner.split('"').skip(1).step_by(2).map(str::to_string).collect());
    }
    Some(
        inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn strip_item(trimmed: &str) -> String {
    let item = trimmed.strip_suffix(',').unwrap_or(trimmed);
    item.replace('"', "")
}

fn unterminated(document: &Document, opened_at: &Line, what: &str) -> ParseError {
    ParseError::error(
        ParseErrorKind::UnterminatedBlock,
        format!("unterminated {}: document ended before it was closed", what),
        opened_at.offset..document.end_offset(),
        document.file_id,
    )
}
