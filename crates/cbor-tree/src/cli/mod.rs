//! Logic behind the `cbor-diag` binary.
//!
//! The binary only parses flags and does I/O; everything that turns input
//! bytes into output text lives here so it can be tested directly.

use thiserror::Error;

use crate::builder::{build_with, BuildError};
use crate::decode::{decode_with, DecodeError};
use crate::diag::to_diag;
use crate::encode::{encode, EncodeError};
use crate::json::{to_json, JsonError};
use crate::node::NodeId;
use crate::options::{BuildOptions, DecodeOptions};
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Binary CBOR.
    Cbor,
    /// Hex-encoded CBOR; whitespace is ignored.
    Hex,
    /// JSON-like text.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Indented diagnostic notation.
    Diag,
    /// Pretty-printed JSON.
    Json,
    /// Hex-encoded CBOR.
    Hex,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("text input is not valid UTF-8 (byte {0})")]
    NotUtf8(usize),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("build failed: {0}")]
    Build(#[from] BuildError),
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),
    #[error("no JSON form: {0}")]
    Json(#[from] JsonError),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// One input-to-output conversion.
#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    pub from: InputFormat,
    pub to: OutputFormat,
    pub decode: DecodeOptions,
    pub build: BuildOptions,
}

impl Conversion {
    pub fn new(from: InputFormat, to: OutputFormat) -> Self {
        Self {
            from,
            to,
            decode: DecodeOptions::default(),
            build: BuildOptions::default(),
        }
    }

    /// Runs the conversion. The result always ends with a newline.
    pub fn run(&self, input: &[u8]) -> Result<String, CliError> {
        match self.from {
            InputFormat::Cbor => {
                let decoded = decode_with(input, &self.decode)?;
                render(&decoded.tree, decoded.root, self.to)
            }
            InputFormat::Hex => {
                let bytes = parse_hex(input)?;
                let decoded = decode_with(&bytes, &self.decode)?;
                render(&decoded.tree, decoded.root, self.to)
            }
            InputFormat::Json => {
                let text =
                    std::str::from_utf8(input).map_err(|e| CliError::NotUtf8(e.valid_up_to()))?;
                let built = build_with(text, &self.build)?;
                render(&built.tree, built.root, self.to)
            }
        }
    }
}

fn parse_hex(input: &[u8]) -> Result<Vec<u8>, hex::FromHexError> {
    let digits: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(digits)
}

fn render(tree: &Tree<'_>, root: NodeId, to: OutputFormat) -> Result<String, CliError> {
    Ok(match to {
        OutputFormat::Diag => to_diag(tree, root),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&to_json(tree, root)?)?;
            out.push('\n');
            out
        }
        OutputFormat::Hex => {
            let mut out = hex::encode(encode(tree, root)?);
            out.push('\n');
            out
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeErrorKind;

    #[test]
    fn hex_to_diag() {
        let out = Conversion::new(InputFormat::Hex, OutputFormat::Diag)
            .run(b"82 01\n20")
            .unwrap();
        assert_eq!(out, "[\n  1\n  -1\n]\n");
    }

    #[test]
    fn json_to_hex() {
        let out = Conversion::new(InputFormat::Json, OutputFormat::Hex)
            .run(br#"{"a": [1, -1]}"#)
            .unwrap();
        assert_eq!(out, "a16161820120\n");
    }

    #[test]
    fn decode_errors_carry_name_and_position() {
        let err = Conversion::new(InputFormat::Cbor, OutputFormat::Diag)
            .run(&[0x00, 0x00])
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Decode(DecodeError {
                kind: DecodeErrorKind::TrailingUnconsumedData,
                pos: 1
            })
        ));
        assert_eq!(
            err.to_string(),
            "decode failed: trailing-unconsumed-data at position 1"
        );
    }

    #[test]
    fn bad_hex_is_reported() {
        let err = Conversion::new(InputFormat::Hex, OutputFormat::Diag)
            .run(b"8")
            .unwrap_err();
        assert!(matches!(err, CliError::Hex(_)));
    }
}
