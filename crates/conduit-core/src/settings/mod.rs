//! Setting file formats.
//!
//! - properties: `key=value` lines, read fully on every lookup.
//! - scalar: a plain text file whose first token is an integer.
//!
//! Both readers return explicit `Result`s; neither caches anything.

pub mod properties;
pub mod scalar;

pub use properties::{parse_properties, read_properties, Properties};
pub use scalar::{parse_first_int, read_first_int};
