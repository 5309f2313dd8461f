//! Properties-file parser (`key=value` / `key: value`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ConduitError, Result};

/// Parsed key/value pairs. Later duplicates win.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// `None` when the key is absent, `Some(Err)` when present but not an integer.
    pub fn get_int(&self, key: &str) -> Option<Result<i64>> {
        self.get(key).map(|raw| {
            raw.parse::<i64>()
                .map_err(|e| ConduitError::Parse(format!("{key}={raw}: {e}")))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn parse_properties(text: &str) -> Properties {
    let mut entries = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        // The key ends at the first `=`, `:` or whitespace. Whitespace may be
        // followed by one `=`/`:` (`key = value`, `key value`).
        let Some(idx) = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace()) else {
            // bare key, empty value
            entries.insert(line.to_string(), String::new());
            continue;
        };
        let (k, rest) = line.split_at(idx);
        let mut chars = rest.chars();
        let sep = chars.next();
        let mut v = chars.as_str().trim_start();
        if sep.is_some_and(char::is_whitespace) {
            v = v.strip_prefix(['=', ':']).unwrap_or(v);
        }
        entries.insert(k.to_string(), v.trim().to_string());
    }
    Properties { entries }
}

/// One full read of a properties file.
pub fn read_properties(path: impl AsRef<Path>) -> Result<Properties> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| ConduitError::io(path, e))?;
    Ok(parse_properties(&s))
}
