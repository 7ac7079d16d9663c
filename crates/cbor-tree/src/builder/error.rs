use thiserror::Error;

use crate::tree::TreeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A close bracket with no open container, or closing the wrong kind.
    #[error("unbalanced close bracket at position {pos}")]
    Structure { pos: usize },
    #[error("unclosed container at end of input (position {pos})")]
    IncompleteStructure { pos: usize },
    #[error("unterminated string literal starting at position {pos}")]
    UnterminatedLiteral { pos: usize },
    #[error("invalid literal at position {pos}")]
    InvalidLiteral { pos: usize },
    #[error("unexpected content after the document at position {pos}")]
    TrailingContent { pos: usize },
    #[error("input contains no value")]
    EmptyInput,
    #[error("range {start}..{end} is outside the input of length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },
    #[error("node allocation failed: {0}")]
    Allocation(#[from] TreeError),
}

impl BuildError {
    /// Input offset the failure was detected at, if it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            BuildError::Structure { pos }
            | BuildError::IncompleteStructure { pos }
            | BuildError::UnterminatedLiteral { pos }
            | BuildError::InvalidLiteral { pos }
            | BuildError::TrailingContent { pos } => Some(*pos),
            BuildError::EmptyInput | BuildError::OutOfRange { .. } | BuildError::Allocation(_) => {
                None
            }
        }
    }
}
