//! Scalar setting file: the first whitespace-delimited token is an integer.

use std::fs;
use std::path::Path;

use crate::error::{ConduitError, Result};

/// `None` when the text has no token or the first token is not an integer.
pub fn parse_first_int(text: &str) -> Option<i64> {
    text.split_whitespace().next()?.parse().ok()
}

pub fn read_first_int(path: impl AsRef<Path>) -> Result<Option<i64>> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| ConduitError::io(path, e))?;
    Ok(parse_first_int(&s))
}
