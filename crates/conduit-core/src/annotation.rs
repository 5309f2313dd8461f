//! Drift annotation record.
//!
//! An annotation is created once per detected change of a polled setting and
//! handed to a sink; nothing is retained locally.

/// Direction of a detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

/// Immutable, timestamped change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Epoch milliseconds at detection time.
    pub time_ms: u64,
    pub key: String,
    pub value: i64,
    pub direction: Direction,
    /// "`<key>` increased to `<value>`" / "`<key>` decreased to `<value>`".
    pub text: String,
}

impl Annotation {
    /// Compare `new` against `prior`; `None` when they are equal.
    pub fn between(key: &str, prior: i64, new: i64, time_ms: u64) -> Option<Self> {
        let direction = match new.cmp(&prior) {
            std::cmp::Ordering::Greater => Direction::Increased,
            std::cmp::Ordering::Less => Direction::Decreased,
            std::cmp::Ordering::Equal => return None,
        };
        Some(Self {
            time_ms,
            key: key.to_string(),
            value: new,
            direction,
            text: format!("{key} {} to {new}", direction.as_str()),
        })
    }
}
