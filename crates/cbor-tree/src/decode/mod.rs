//! Binary CBOR to value tree.
//!
//! Decoding is a single forward pass with no recursion: open containers
//! sit on a frame stack together with the number of children they still
//! expect (or none, for indefinite-length ones). Definite strings are not
//! copied; their nodes borrow from the input buffer.

mod error;

pub use error::{DecodeError, DecodeErrorKind};

use std::borrow::Cow;

use crate::constants::*;
use crate::node::{NodeId, Value};
use crate::options::DecodeOptions;
use crate::tree::Tree;

/// A decoded buffer.
#[derive(Debug)]
pub struct Decoded<'a> {
    pub tree: Tree<'a>,
    pub root: NodeId,
}

pub fn decode(bytes: &[u8]) -> Result<Decoded<'_>, DecodeError> {
    decode_with(bytes, &DecodeOptions::default())
}

pub fn decode_with<'a>(bytes: &'a [u8], options: &DecodeOptions) -> Result<Decoded<'a>, DecodeError> {
    let mut decoder = CborTreeDecoder {
        data: bytes,
        x: 0,
        tree: Tree::with_limits(options.limits),
        stack: Vec::new(),
        floats: options.floats && cfg!(feature = "float"),
    };
    match decoder.run() {
        Ok(root) => {
            tracing::debug!(len = bytes.len(), nodes = decoder.tree.live_nodes(), "decoded");
            Ok(Decoded {
                tree: decoder.tree,
                root,
            })
        }
        Err(err) => {
            tracing::debug!(kind = err.kind.name(), pos = err.pos, "decode failed");
            Err(err)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    /// Children still expected; `None` until a break for indefinite lengths.
    remaining: Option<u64>,
}

enum Children {
    None,
    Definite(u64),
    Indefinite,
}

struct CborTreeDecoder<'a> {
    data: &'a [u8],
    x: usize,
    tree: Tree<'a>,
    stack: Vec<Frame>,
    floats: bool,
}

impl<'a> CborTreeDecoder<'a> {
    #[inline]
    fn fail(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(kind, self.x)
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let data = self.data;
        if data.len() - self.x < n {
            return Err(self.fail(DecodeErrorKind::OutOfData));
        }
        let slice = &data[self.x..self.x + n];
        self.x += n;
        Ok(slice)
    }

    #[inline]
    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn uint(&mut self, n: usize) -> Result<u64, DecodeError> {
        Ok(self
            .take(n)?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
    }

    fn run(&mut self) -> Result<NodeId, DecodeError> {
        loop {
            let ib = self.u8()?;
            tracing::trace!(pos = self.x - 1, ib, depth = self.stack.len(), "item");
            let mut done = if ib == BREAK {
                self.close_indefinite()?
            } else {
                let (value, children) = self.read_item(ib)?;
                let id = self
                    .tree
                    .alloc(value)
                    .map_err(|_| self.fail(DecodeErrorKind::AllocationFailure))?;
                if let Some(parent) = self.stack.last() {
                    self.tree.link(parent.node, id);
                }
                match children {
                    Children::None | Children::Definite(0) => id,
                    Children::Definite(n) => {
                        self.stack.push(Frame {
                            node: id,
                            remaining: Some(n),
                        });
                        continue;
                    }
                    Children::Indefinite => {
                        self.stack.push(Frame {
                            node: id,
                            remaining: None,
                        });
                        continue;
                    }
                }
            };
            // `done` is complete: count it against its parent, closing every
            // definite container that this fills up.
            loop {
                let Some(frame) = self.stack.last_mut() else {
                    if self.x != self.data.len() {
                        return Err(self.fail(DecodeErrorKind::TrailingUnconsumedData));
                    }
                    return Ok(done);
                };
                match &mut frame.remaining {
                    Some(remaining) => {
                        *remaining -= 1;
                        if *remaining > 0 {
                            break;
                        }
                        done = frame.node;
                        self.stack.pop();
                    }
                    None => break,
                }
            }
        }
    }

    fn close_indefinite(&mut self) -> Result<NodeId, DecodeError> {
        let frame = match self.stack.last() {
            Some(frame) if frame.remaining.is_none() => *frame,
            _ => return Err(self.fail(DecodeErrorKind::BreakOutsideIndefinite)),
        };
        let node = &self.tree[frame.node];
        if matches!(node.value, Value::Map) && node.length % 2 != 0 {
            return Err(self.fail(DecodeErrorKind::OddSizeIndefiniteMap));
        }
        self.stack.pop();
        Ok(frame.node)
    }

    /// Major type of the chunks the innermost open chunked string accepts.
    fn chunk_major(&self) -> Option<u8> {
        let frame = self.stack.last()?;
        match self.tree[frame.node].value {
            Value::BytesChunked => Some(MAJOR_BYTES),
            Value::TextChunked => Some(MAJOR_TEXT),
            _ => None,
        }
    }

    fn read_item(&mut self, ib: u8) -> Result<(Value<'a>, Children), DecodeError> {
        let major = ib >> 5;
        let ai = ib & 0x1f;
        if let Some(expected) = self.chunk_major() {
            if major != expected || ai == AI_INDEFINITE {
                return Err(self.fail(DecodeErrorKind::WrongNestingInIndefiniteString));
            }
        }
        let indefinite = ai == AI_INDEFINITE;
        let val = match ai {
            0..=23 => u64::from(ai),
            AI_ONE_BYTE => self.uint(1)?,
            AI_TWO_BYTES => self.uint(2)?,
            AI_FOUR_BYTES => self.uint(4)?,
            AI_EIGHT_BYTES => self.uint(8)?,
            AI_INDEFINITE => 0,
            _ => return Err(self.fail(DecodeErrorKind::ReservedAdditionalInfo)),
        };
        if indefinite && matches!(major, MAJOR_UNSIGNED | MAJOR_NEGATIVE | MAJOR_TAG) {
            return Err(self.fail(DecodeErrorKind::MajorTypeUndefinedForIndefinite));
        }
        Ok(match major {
            MAJOR_UNSIGNED => (Value::Uint(val), Children::None),
            MAJOR_NEGATIVE => (Value::Int(-1 - i128::from(val)), Children::None),
            MAJOR_BYTES | MAJOR_TEXT if indefinite => {
                let value = if major == MAJOR_BYTES {
                    Value::BytesChunked
                } else {
                    Value::TextChunked
                };
                (value, Children::Indefinite)
            }
            MAJOR_BYTES | MAJOR_TEXT => {
                let len =
                    usize::try_from(val).map_err(|_| self.fail(DecodeErrorKind::OutOfData))?;
                let bytes = Cow::Borrowed(self.take(len)?);
                let value = if major == MAJOR_BYTES {
                    Value::Bytes(bytes)
                } else {
                    Value::Text(bytes)
                };
                (value, Children::None)
            }
            MAJOR_ARRAY if indefinite => (Value::Array, Children::Indefinite),
            MAJOR_ARRAY => (Value::Array, Children::Definite(val)),
            MAJOR_MAP if indefinite => (Value::Map, Children::Indefinite),
            MAJOR_MAP => {
                let items = val
                    .checked_mul(2)
                    .ok_or_else(|| self.fail(DecodeErrorKind::OutOfData))?;
                (Value::Map, Children::Definite(items))
            }
            MAJOR_TAG => (Value::Tag(val), Children::Definite(1)),
            _ => (self.read_simple(ai, val)?, Children::None),
        })
    }

    fn read_simple(&self, ai: u8, val: u64) -> Result<Value<'a>, DecodeError> {
        let value = match ai {
            SIMPLE_FALSE => Value::False,
            SIMPLE_TRUE => Value::True,
            SIMPLE_NULL => Value::Null,
            SIMPLE_UNDEFINED => Value::Undefined,
            AI_TWO_BYTES | AI_FOUR_BYTES | AI_EIGHT_BYTES => {
                if !self.floats {
                    return Err(self.fail(DecodeErrorKind::FloatUnsupported));
                }
                Value::Double(match ai {
                    AI_TWO_BYTES => half_to_f64(val as u16),
                    AI_FOUR_BYTES => f64::from(f32::from_bits(val as u32)),
                    _ => f64::from_bits(val),
                })
            }
            // One-byte simple values, or 0..=19 inline.
            _ => Value::Simple(val as u8),
        };
        Ok(value)
    }
}

fn half_to_f64(bits: u16) -> f64 {
    let exp = i32::from((bits >> 10) & 0x1f);
    let mant = f64::from(bits & 0x3ff);
    let magnitude = match exp {
        0 => mant * 2f64.powi(-24),
        31 if mant == 0.0 => f64::INFINITY,
        31 => f64::NAN,
        _ => (mant + 1024.0) * 2f64.powi(exp - 25),
    };
    if bits & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}
