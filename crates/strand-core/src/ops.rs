//! Built-in string operations.
//!
//! Everything here is byte-oriented: `reverse` reverses bytes, `substring`
//! slices bytes, case folds touch ASCII letters only. Values are UTF-8
//! strings, so operations that can produce arbitrary byte sequences
//! re-validate their output and fail if it is no longer valid UTF-8; on
//! ASCII data they behave exactly like their byte-string counterparts.
//!
//! Numeric constants are strict decimal ASCII (digits only); anything else
//! is rejected by the operation.

use crate::error::OpError;
use crate::registry::{OperationRegistry, StringOp};
use crate::value::Value;

/// ASCII whitespace recognized by `trim` and `title`.
const ASCII_WHITESPACE: &[u8] = b" \t\n\r\x0b\x0c";

// ============================================================================
// Argument helpers
// ============================================================================

fn expect_arity(
    op: &str,
    inputs: &[&str],
    constants: &[&str],
    want_inputs: usize,
    want_constants: usize,
) -> Result<(), OpError> {
    if inputs.len() != want_inputs || constants.len() != want_constants {
        return Err(OpError::new(format!(
            "{op} expects {want_inputs} input(s) and {want_constants} constant(s), \
             got {} input(s) and {} constant(s)",
            inputs.len(),
            constants.len()
        )));
    }
    Ok(())
}

fn parse_decimal(op: &str, what: &str, raw: &str) -> Result<usize, OpError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OpError::new(format!(
            "{op}: {what} '{raw}' is not a decimal number"
        )));
    }
    raw.parse()
        .map_err(|_| OpError::new(format!("{op}: {what} '{raw}' is out of range")))
}

fn bytes_to_string(op: &str, bytes: Vec<u8>) -> Result<String, OpError> {
    String::from_utf8(bytes)
        .map_err(|_| OpError::new(format!("{op} produced bytes that are not valid UTF-8")))
}

fn is_ascii_space(b: u8) -> bool {
    ASCII_WHITESPACE.contains(&b)
}

fn trim_ascii(x: &str) -> &str {
    let bytes = x.as_bytes();
    let start = bytes
        .iter()
        .position(|b| !is_ascii_space(*b))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !is_ascii_space(*b))
        .map_or(start, |i| i + 1);
    &x[start..end]
}

// ============================================================================
// Unary operations (one input, no constants)
// ============================================================================

macro_rules! define_unary_op {
    ($name:ident, $str_name:literal, |$arg:ident| $body:expr) => {
        pub struct $name;

        impl StringOp for $name {
            fn name(&self) -> &str {
                $str_name
            }

            fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
                expect_arity($str_name, inputs, constants, 1, 0)?;
                let $arg = inputs[0];
                ($body).map(Value::Single)
            }
        }
    };
}

define_unary_op!(Identity, "identity", |x| Ok(x.to_string()));
define_unary_op!(Reverse, "reverse", |x| bytes_to_string(
    "reverse",
    x.bytes().rev().collect()
));
define_unary_op!(ToUpper, "to_upper", |x| Ok(x
    .chars()
    .map(|c| c.to_ascii_uppercase())
    .collect()));
define_unary_op!(ToLower, "to_lower", |x| Ok(x
    .chars()
    .map(|c| c.to_ascii_lowercase())
    .collect()));
define_unary_op!(Trim, "trim", |x| Ok(trim_ascii(x).to_string()));
define_unary_op!(Capitalize, "capitalize", |x| {
    let mut seen_letter = false;
    Ok(x.chars()
        .map(|c| {
            if !c.is_ascii_alphabetic() {
                c
            } else if seen_letter {
                c.to_ascii_lowercase()
            } else {
                seen_letter = true;
                c.to_ascii_uppercase()
            }
        })
        .collect())
});
define_unary_op!(Title, "title", |x| {
    let mut start_of_word = true;
    Ok(x.chars()
        .map(|c| {
            if c.is_ascii() && is_ascii_space(c as u8) {
                start_of_word = true;
                c
            } else if !c.is_ascii_alphabetic() {
                c
            } else if start_of_word {
                start_of_word = false;
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect())
});

// ============================================================================
// Variadic and parameterized operations
// ============================================================================

/// `concat`: all inputs then all constants, any arity on either side.
pub struct Concat;

impl StringOp for Concat {
    fn name(&self) -> &str {
        "concat"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        let total: usize = inputs.iter().chain(constants).map(|s| s.len()).sum();
        let mut out = String::with_capacity(total);
        for s in inputs.iter().chain(constants) {
            out.push_str(s);
        }
        Ok(Value::Single(out))
    }
}

/// `split(x; d)`: multi-output. An empty delimiter splits into one output
/// per byte (none at all for empty input); otherwise the outputs are the
/// substrings between left-to-right occurrences of `d`, one more output
/// than there are occurrences.
pub struct Split;

impl StringOp for Split {
    fn name(&self) -> &str {
        "split"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        expect_arity("split", inputs, constants, 1, 1)?;
        let x = inputs[0];
        let delimiter = constants[0];

        let parts = if delimiter.is_empty() {
            x.bytes()
                .map(|b| bytes_to_string("split", vec![b]))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            x.split(delimiter).map(String::from).collect()
        };
        Ok(Value::Multi(parts))
    }
}

/// `replace(x; old, new)`: left-to-right non-overlapping substitution.
pub struct Replace;

impl StringOp for Replace {
    fn name(&self) -> &str {
        "replace"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        expect_arity("replace", inputs, constants, 1, 2)?;
        let x = inputs[0];
        let (old, new) = (constants[0], constants[1]);
        if old.is_empty() {
            return Ok(Value::Single(x.to_string()));
        }
        Ok(Value::Single(x.replace(old, new)))
    }
}

/// `substring(x; start, len)`: byte slice. A start at or past the end
/// yields the empty string; an empty or `"-1"` length means "to the end".
pub struct Substring;

impl StringOp for Substring {
    fn name(&self) -> &str {
        "substring"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        expect_arity("substring", inputs, constants, 1, 2)?;
        let bytes = inputs[0].as_bytes();
        let start = parse_decimal("substring", "start", constants[0])?;
        if start >= bytes.len() {
            return Ok(Value::Single(String::new()));
        }

        let len_raw = constants[1];
        let end = if len_raw.is_empty() || len_raw == "-1" {
            bytes.len()
        } else {
            let len = parse_decimal("substring", "length", len_raw)?;
            bytes.len().min(start.saturating_add(len))
        };
        bytes_to_string("substring", bytes[start..end].to_vec()).map(Value::Single)
    }
}

/// `repeat(x; n)`: `x` concatenated `n` times.
pub struct Repeat;

impl StringOp for Repeat {
    fn name(&self) -> &str {
        "repeat"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        expect_arity("repeat", inputs, constants, 1, 1)?;
        let x = inputs[0];
        let n = parse_decimal("repeat", "count", constants[0])?;
        x.len()
            .checked_mul(n)
            .ok_or_else(|| OpError::new("repeat: result would be too large"))?;
        Ok(Value::Single(x.repeat(n)))
    }
}

fn pad(op: &str, x: &str, constants: &[&str], on_left: bool) -> Result<String, OpError> {
    let width = parse_decimal(op, "width", constants[0])?;
    let fill = constants[1].as_bytes().first().copied().unwrap_or(b' ');
    if x.len() >= width {
        return Ok(x.to_string());
    }

    let mut bytes = Vec::with_capacity(width);
    if on_left {
        bytes.resize(width - x.len(), fill);
        bytes.extend_from_slice(x.as_bytes());
    } else {
        bytes.extend_from_slice(x.as_bytes());
        bytes.resize(width, fill);
    }
    bytes_to_string(op, bytes)
}

/// `pad_left(x; w, fill)`: pad to byte width `w` with the first byte of
/// `fill` (space when `fill` is empty).
pub struct PadLeft;

impl StringOp for PadLeft {
    fn name(&self) -> &str {
        "pad_left"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        expect_arity("pad_left", inputs, constants, 1, 2)?;
        pad("pad_left", inputs[0], constants, true).map(Value::Single)
    }
}

/// `pad_right(x; w, fill)`: like `pad_left`, on the other side.
pub struct PadRight;

impl StringOp for PadRight {
    fn name(&self) -> &str {
        "pad_right"
    }

    fn apply(&self, inputs: &[&str], constants: &[&str]) -> Result<Value, OpError> {
        expect_arity("pad_right", inputs, constants, 1, 2)?;
        pad("pad_right", inputs[0], constants, false).map(Value::Single)
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Registers every built-in operation. Called once by
/// [`OperationRegistry::global`]; safe to call on any registry.
pub fn register_builtins(registry: &OperationRegistry) {
    registry.register(Identity);
    registry.register(Reverse);
    registry.register(Concat);
    registry.register(ToUpper);
    registry.register(ToLower);
    registry.register(Split);
    registry.register(Trim);
    registry.register(Replace);
    registry.register(Substring);
    registry.register(Repeat);
    registry.register(PadLeft);
    registry.register(PadRight);
    registry.register(Capitalize);
    registry.register(Title);
}
