//! Diagnostic notation: an indented, one-value-per-line text dump of a tree.
//!
//! ```text
//! {
//!   "a"
//!   1
//!   "b"
//!   [
//!     2
//!     3
//!   ]
//! }
//! ```
//!
//! Output goes to any [`fmt::Write`] sink, so nothing has to be sized up
//! front. Rendering never fails on odd trees: unknown kinds print as
//! `???<code>???` and maps with a dangling key print the key like any other
//! child.

use std::fmt::{self, Write};

use crate::node::{NodeId, Value};
use crate::tree::Tree;

/// Spaces per nesting level.
pub const INDENT_WIDTH: usize = 2;

enum Step {
    Enter(NodeId, usize),
    Exit(char, usize),
}

/// Writes `root` and its subtree starting at nesting `depth`.
pub fn write_diag<W: Write>(
    tree: &Tree<'_>,
    root: Option<NodeId>,
    depth: usize,
    out: &mut W,
) -> fmt::Result {
    let Some(root) = root else {
        return Ok(());
    };
    let mut steps = vec![Step::Enter(root, depth)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Exit(close, depth) => {
                indent(out, depth)?;
                out.write_char(close)?;
                out.write_char('\n')?;
            }
            Step::Enter(id, depth) => {
                let Some(node) = tree.get(id) else {
                    continue;
                };
                indent(out, depth)?;
                let close = match &node.value {
                    Value::Array => Some(('[', ']')),
                    Value::Map => Some(('{', '}')),
                    Value::BytesChunked | Value::TextChunked => {
                        out.write_char('(')?;
                        Some(('_', ')'))
                    }
                    Value::Tag(tag) => {
                        write!(out, "{tag}")?;
                        Some(('(', ')'))
                    }
                    scalar => {
                        write_scalar(out, scalar)?;
                        None
                    }
                };
                match close {
                    Some((open, close)) => {
                        out.write_char(open)?;
                        out.write_char('\n')?;
                        steps.push(Step::Exit(close, depth));
                        let children: Vec<NodeId> = tree.children(id).collect();
                        steps.extend(children.into_iter().rev().map(|c| Step::Enter(c, depth + 1)));
                    }
                    None => out.write_char('\n')?,
                }
            }
        }
    }
    Ok(())
}

/// Renders `root` at depth zero into a new string.
pub fn to_diag(tree: &Tree<'_>, root: NodeId) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_diag(tree, Some(root), 0, &mut out);
    out
}

fn indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth * INDENT_WIDTH {
        out.write_char(' ')?;
    }
    Ok(())
}

fn write_scalar<W: Write>(out: &mut W, value: &Value<'_>) -> fmt::Result {
    match value {
        Value::Uint(u) => write!(out, "{u}"),
        Value::Int(i) => write!(out, "{i}"),
        Value::Double(d) => write_exponential(out, *d),
        Value::Bytes(b) => write!(out, "h'{}'", hex::encode(b)),
        Value::Text(b) => write_text(out, b),
        Value::True => out.write_str("true"),
        Value::False => out.write_str("false"),
        Value::Null => out.write_str("null"),
        Value::Undefined => out.write_str("undefined"),
        Value::Simple(v) => write!(out, "simple({v})"),
        Value::Invalid(code) => write!(out, "???{code}???"),
        Value::Array
        | Value::Map
        | Value::Tag(_)
        | Value::BytesChunked
        | Value::TextChunked => write!(out, "???{}???", value.kind().code()),
    }
}

/// Quoted text. Quotes, backslashes and control characters are escaped;
/// bytes that are not UTF-8 print as `\xNN`.
fn write_text<W: Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    out.write_char('"')?;
    for chunk in bytes.utf8_chunks() {
        for ch in chunk.valid().chars() {
            match ch {
                '"' => out.write_str("\\\"")?,
                '\\' => out.write_str("\\\\")?,
                '\n' => out.write_str("\\n")?,
                '\r' => out.write_str("\\r")?,
                '\t' => out.write_str("\\t")?,
                c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
                c => out.write_char(c)?,
            }
        }
        for b in chunk.invalid() {
            write!(out, "\\x{b:02x}")?;
        }
    }
    out.write_char('"')
}

/// `d.dddddde+XX`, six fractional digits and at least two exponent digits.
fn write_exponential<W: Write>(out: &mut W, value: f64) -> fmt::Result {
    if value.is_nan() {
        return out.write_str("nan");
    }
    if value.is_infinite() {
        return out.write_str(if value < 0.0 { "-inf" } else { "inf" });
    }
    let formatted = format!("{value:.6e}");
    let (mantissa, exp) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    write!(out, "{mantissa}e{sign}{:02}", exp.unsigned_abs())
}
