use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use kv2::parser::ParseError;

/// Reasons a generation run aborts. Nothing is written to the destination when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("destination is not a controller document: first line is {first_line:?}")]
    NotAControllerDocument { first_line: String },

    #[error("no ID source document selected")]
    MissingIdSource,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("control block has no `{field}` field")]
    MalformedControlBlock {
        field: &'static str,
        span: Range<usize>,
        file_id: usize,
    },

    #[error("ID source has no `element_array` line opening the control list")]
    MissingControlArray,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    /// A codespan diagnostic for errors that point into a source document.
    pub fn to_diagnostic(&self) -> Option<Diagnostic<usize>> {
        match self {
            GenerateError::Parse(err) => Some(err.to_diagnostic()),
            GenerateError::MalformedControlBlock { span, file_id, .. } => Some(
                Diagnostic::error()
                    .with_message(self.to_string())
                    .with_labels(vec![Label::primary(*file_id, span.clone())])
                    .with_notes(vec![
                        "every control block needs a scalar `id` and `name`".to_string(),
                    ]),
            ),
            _ => None,
        }
    }
}

/// Conditions reported next to a successful run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateWarning {
    #[error("generated {count} controllers, more than the {limit} the consuming application supports")]
    SoftLimitExceeded { count: usize, limit: usize },

    #[error("combination record {} has no `rawControlNames` array and was skipped", .name.as_deref().unwrap_or("(unnamed)"))]
    RecordWithoutControlNames {
        name: Option<String>,
        span: Range<usize>,
        file_id: usize,
    },
}

impl GenerateWarning {
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::new(Severity::Warning).with_message(self.to_string());
        match self {
            GenerateWarning::RecordWithoutControlNames { span, file_id, .. } => {
                diagnostic.with_labels(vec![Label::primary(*file_id, span.clone())])
            }
            GenerateWarning::SoftLimitExceeded { .. } => diagnostic,
        }
    }
}
