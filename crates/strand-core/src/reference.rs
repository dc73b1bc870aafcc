//! Parsing of node output addresses.
//!
//! An address names either the sole output of a node (`"name"`) or the k-th
//! output of a multi-output node (`"name:2"`). The same syntax is used for
//! input references inside nodes and for the evaluation target.

use crate::error::GraphError;

/// A parsed output address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// The addressed node id.
    pub id: &'a str,
    /// Output index for multi-output nodes; `None` addresses the sole output.
    pub index: Option<usize>,
}

/// Parse an `id` or `id:k` address.
///
/// The index, when present, must be a non-empty run of decimal digits. Any
/// other shape (empty id, multiple colons, signs, blanks) is an addressing
/// error.
pub fn parse_reference(raw: &str) -> Result<Reference<'_>, GraphError> {
    let bad = |reason: &str| GraphError::Addressing {
        reference: raw.to_string(),
        reason: reason.to_string(),
    };

    let (id, index) = match raw.split_once(':') {
        None => (raw, None),
        Some((id, index)) => {
            if index.contains(':') {
                return Err(bad("more than one ':' in address"));
            }
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad("output index must be decimal digits"));
            }
            let index: usize = index
                .parse()
                .map_err(|_| bad("output index out of range"))?;
            (id, Some(index))
        }
    };

    if id.is_empty() {
        return Err(bad("empty node id"));
    }
    Ok(Reference { id, index })
}

/// The node id an address refers to, with any `:k` suffix stripped.
///
/// Tolerant of malformed indices; reachability analysis uses this to find
/// the base node while full validation is left to [`parse_reference`].
pub fn base_id(raw: &str) -> &str {
    match raw.split_once(':') {
        Some((id, _)) => id,
        None => raw,
    }
}
