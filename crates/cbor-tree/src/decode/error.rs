use std::fmt;

use thiserror::Error;

/// Why a byte buffer could not be decoded into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// The buffer ended inside an item.
    OutOfData,
    /// Bytes remain after the top-level item.
    TrailingUnconsumedData,
    /// An indefinite-length map was closed after a key with no value.
    OddSizeIndefiniteMap,
    /// A break byte with no indefinite-length container open.
    BreakOutsideIndefinite,
    /// Indefinite length on a major type that has none (integers, tags).
    MajorTypeUndefinedForIndefinite,
    /// Additional information 28, 29 or 30.
    ReservedAdditionalInfo,
    /// A chunk of an indefinite-length string that is not a definite string
    /// of the same major type.
    WrongNestingInIndefiniteString,
    /// The node arena refused to grow.
    AllocationFailure,
    /// A float item while float support is disabled.
    FloatUnsupported,
}

impl DecodeErrorKind {
    pub const ALL: [DecodeErrorKind; 9] = [
        DecodeErrorKind::OutOfData,
        DecodeErrorKind::TrailingUnconsumedData,
        DecodeErrorKind::OddSizeIndefiniteMap,
        DecodeErrorKind::BreakOutsideIndefinite,
        DecodeErrorKind::MajorTypeUndefinedForIndefinite,
        DecodeErrorKind::ReservedAdditionalInfo,
        DecodeErrorKind::WrongNestingInIndefiniteString,
        DecodeErrorKind::AllocationFailure,
        DecodeErrorKind::FloatUnsupported,
    ];

    /// Stable identifier, suitable for logs and scripted checks.
    pub fn name(self) -> &'static str {
        match self {
            DecodeErrorKind::OutOfData => "out-of-data",
            DecodeErrorKind::TrailingUnconsumedData => "trailing-unconsumed-data",
            DecodeErrorKind::OddSizeIndefiniteMap => "odd-size-indefinite-map",
            DecodeErrorKind::BreakOutsideIndefinite => "break-outside-indefinite",
            DecodeErrorKind::MajorTypeUndefinedForIndefinite => "major-type-undefined-for-indefinite",
            DecodeErrorKind::ReservedAdditionalInfo => "reserved-additional-info",
            DecodeErrorKind::WrongNestingInIndefiniteString => "wrong-nesting-in-indefinite-string",
            DecodeErrorKind::AllocationFailure => "allocation-failure",
            DecodeErrorKind::FloatUnsupported => "float-unsupported",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decode failure and the byte offset it was detected at.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at position {pos}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub pos: usize,
}

impl DecodeError {
    pub fn new(kind: DecodeErrorKind, pos: usize) -> Self {
        Self { kind, pos }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = DecodeErrorKind::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DecodeErrorKind::ALL.len());
    }

    #[test]
    fn display_includes_position() {
        let err = DecodeError::new(DecodeErrorKind::OutOfData, 7);
        assert_eq!(err.to_string(), "out-of-data at position 7");
    }
}
